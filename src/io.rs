use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, VmError};
use crate::vm_manager::VmManager;

/// Contents of a seed file.
///
/// Line 1 holds `(segment, length, location)` triplets for the segment
/// table, line 2 holds `(segment, page, location)` triplets for the page
/// tables. Locations are frame ids, or negated store block ids.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedData {
    pub st_entries: Vec<(u32, i32, i32)>,
    pub pt_entries: Vec<(u32, u32, i32)>,
}

impl SeedData {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut lines = content.lines();
        let st_line = lines.next().ok_or_else(|| VmError::parse(1, "seed file is empty"))?;

        let st_entries = parse_triplets(st_line, 1)?;
        let pt_entries = match lines.next() {
            Some(line) => parse_triplets(line, 2)?,
            None => Vec::new(),
        };

        Ok(SeedData { st_entries, pt_entries })
    }

    /// Install every segment entry, then every page entry.
    pub fn apply(&self, vm: &mut VmManager) -> Result<()> {
        for &(segment, length, location) in &self.st_entries {
            vm.install_segment(segment, length, location)?;
        }
        for &(segment, page, location) in &self.pt_entries {
            vm.install_page(segment, page, location)?;
        }
        Ok(())
    }

    /// True when some table or page starts out on the store.
    pub fn uses_store(&self) -> bool {
        self.st_entries.iter().any(|&(_, _, loc)| loc < 0)
            || self.pt_entries.iter().any(|&(_, _, loc)| loc < 0)
    }
}

fn parse_triplets<A, B>(line: &str, line_no: usize) -> Result<Vec<(u32, A, B)>>
where
    A: FromStr,
    B: FromStr,
{
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() % 3 != 0 {
        return Err(VmError::parse(
            line_no,
            format!("{} tokens, expected a multiple of 3", tokens.len()),
        ));
    }

    tokens
        .chunks(3)
        .map(|chunk| -> Result<(u32, A, B)> {
            Ok((
                parse_token(chunk[0], line_no)?,
                parse_token(chunk[1], line_no)?,
                parse_token(chunk[2], line_no)?,
            ))
        })
        .collect()
}

fn parse_token<T: FromStr>(token: &str, line_no: usize) -> Result<T> {
    token
        .parse()
        .map_err(|_| VmError::parse(line_no, format!("invalid integer {:?}", token)))
}

pub fn parse_virtual_addresses(content: &str) -> Result<Vec<u32>> {
    content
        .lines()
        .enumerate()
        .flat_map(|(i, line)| line.split_whitespace().map(move |token| (i + 1, token)))
        .map(|(line_no, token)| parse_token::<u32>(token, line_no))
        .collect()
}

pub fn read_virtual_addresses<P: AsRef<Path>>(path: P) -> Result<Vec<u32>> {
    let content = fs::read_to_string(path.as_ref())?;
    parse_virtual_addresses(&content)
}

pub fn format_results(results: &[i64]) -> String {
    let output: Vec<String> = results.iter().map(|r| r.to_string()).collect();
    output.join(" ")
}

pub fn write_results<P: AsRef<Path>>(path: P, results: &[i64]) -> Result<()> {
    fs::write(path.as_ref(), format_results(results))?;
    Ok(())
}
