use std::fs;
use std::path::PathBuf;

use vm_manager::io::{SeedData, read_virtual_addresses, write_results};
use vm_manager::{Location, TranslationResult, VirtualAddress, VmConfig, VmError, VmManager};

fn manager() -> VmManager {
    VmManager::new(VmConfig::default()).unwrap()
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("vm-manager-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn page_table_and_page_fault_in_one_translation() {
    let mut vm = manager();
    vm.install_segment(0, 20, -3).unwrap();
    vm.install_page(0, 0, -7).unwrap();

    let result = vm.translate(VirtualAddress::new(0, 0, 5).va).unwrap();

    // Frame 1 takes the page table, frame 2 the page
    assert_eq!(result, TranslationResult::Success(2 * 512 + 5));
    assert_eq!(vm.stats().page_table_faults, 1);
    assert_eq!(vm.stats().page_faults, 1);
    assert_eq!(vm.memory().segment_location(0), Location::Resident(1));
}

#[test]
fn bound_violation_triggers_no_fault() {
    let mut vm = manager();
    vm.install_segment(0, 20, -3).unwrap();
    vm.install_page(0, 0, -7).unwrap();

    let va = VirtualAddress::from_raw(25);
    assert_eq!(va.pw, 25);
    assert_eq!(vm.translate(va.va).unwrap(), TranslationResult::SegmentationFault);
    assert_eq!(vm.stats().total_faults(), 0);
    assert_eq!(vm.memory().segment_location(0), Location::OnStore(3));
    assert_eq!(vm.free_frames().free_count(), 1023);
}

#[test]
fn bootstrapped_frame_is_never_allocated() {
    let mut vm = manager();
    vm.install_segment(0, 10, 5).unwrap();
    assert!(!vm.free_frames().contains(5));

    let mut pool = vm.free_frames().clone();
    let mut handed_out = Vec::new();
    while let Ok(frame) = pool.allocate() {
        handed_out.push(frame);
    }
    assert_eq!(handed_out.len(), 1022);
    assert!(!handed_out.contains(&5));
    assert_eq!(handed_out[..5], [1, 2, 3, 4, 6]);
}

#[test]
fn resident_only_seed_translates_without_faults() {
    let seed = SeedData::parse("6 3000 4\n6 5 9").unwrap();
    let mut vm = manager();
    seed.apply(&mut vm).unwrap();

    let results = vm.translate_batch(&[1575424, 1575863, 1575864]).unwrap();
    assert_eq!(results, vec![4608, 5047, -1]);
    assert_eq!(vm.stats().total_faults(), 0);
}

#[test]
fn faulted_page_table_reflects_store_image() {
    let mut vm = manager();
    vm.install_segment(9, 5000, -7).unwrap();
    vm.install_page(9, 0, 13).unwrap();
    vm.install_page(9, 1, -25).unwrap();
    vm.store_mut().write(7, 200, 42);

    vm.translate(VirtualAddress::new(9, 0, 0).va).unwrap();

    let pt_frame = vm.memory().segment_location(9).frame().unwrap();
    assert_eq!(vm.memory().frame(pt_frame), vm.store().block(7));
    assert_eq!(vm.memory().page_location(pt_frame, 1), Location::OnStore(25));
}

#[test]
fn pool_exhaustion_stops_the_batch() {
    let mut vm = VmManager::new(VmConfig::new(512, 2).unwrap()).unwrap();
    vm.install_segment(0, 512, -1).unwrap();
    vm.install_page(0, 0, -1).unwrap();

    let err = vm.translate_batch(&[0, 1, 2]).unwrap_err();
    assert!(matches!(err, VmError::PoolExhausted));
    assert_eq!(vm.stats().page_table_faults, 1);
}

#[test]
fn batch_files_end_to_end() {
    let dir = scratch_dir("batch");
    let init = dir.join("init-dp.txt");
    let input = dir.join("input-dp.txt");
    let output = dir.join("output-dp.txt");
    fs::write(&init, "8 4000 3 9 5000 -7\n8 0 10 8 1 -20 9 0 13 9 1 -25\n").unwrap();
    fs::write(&input, "2097162 2097674 2359306 2359818 2095106\n").unwrap();

    let seed = SeedData::from_file(&init).unwrap();
    let mut vm = manager();
    seed.apply(&mut vm).unwrap();
    let vas = read_virtual_addresses(&input).unwrap();
    let results = vm.translate_batch(&vas).unwrap();
    write_results(&output, &results).unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), "5130 522 6666 2058 -1");
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_seed_file_is_io_error() {
    let dir = scratch_dir("missing");
    let err = SeedData::from_file(dir.join("nope.txt")).unwrap_err();
    assert!(matches!(err, VmError::Io(_)));
    fs::remove_dir_all(&dir).ok();
}
