use codeception_adapter::adapter::{memory_used_mb, tests_passed};
use codeception_adapter::{
    AdapterConfig, CodeceptionAdapter, MutationDescriptor, RunnerConfig, TestFrameworkAdapter,
    TestLocation,
};

#[test]
fn root_exports_drive_a_mutant_run() {
    let tmp = tempfile::tempdir().expect("tempdir should be created");
    let config = AdapterConfig::default()
        .with_executable("/path/to/codecept")
        .with_tmp_dir(tmp.path());
    let adapter = CodeceptionAdapter::new(config, RunnerConfig::default());

    let argv = adapter
        .mutant_command(
            &[TestLocation::new("tests/unit/FooTest.php", 0.3)],
            &MutationDescriptor::new("abc123", "/src/Foo.php", "/tmp/Foo.mutant.php"),
            "",
        )
        .expect("mutant command should build");

    assert_eq!(argv[0], "/path/to/codecept");
    assert!(argv.contains(&"groups: infection: [tests/unit/FooTest.php]".to_string()));
    assert!(tmp.path().join("interceptor.codeception.abc123.php").is_file());

    assert!(tests_passed("OK (1 test, 1 assertion)"));
    assert_eq!(memory_used_mb("Memory: 4.00 MB"), 4.0);
}
