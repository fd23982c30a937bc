use crate::harness::Scenario;

fn two_versions(name: &str) -> Scenario {
    Scenario::new(name)
        .version("v5.0", &[("README", "Linux 5.0\n"), ("init/main.c", "int main(void);\n")])
        .version("v5.1", &[("README", "Linux 5.1\n"), ("init/main.c", "int start_kernel(void);\n")])
}

#[test]
fn test_parallel_readers_of_different_versions_never_mix() {
    two_versions("parallel_readers_never_mix")
        .assert_concurrent_reads(
            &[
                ("v5.0", "/README", "Linux 5.0\n"),
                ("v5.1", "/README", "Linux 5.1\n"),
                ("v5.0", "/init/main.c", "int main(void);\n"),
                ("v5.1", "/init/main.c", "int start_kernel(void);\n"),
            ],
            10,
        )
        .run()
        .unwrap();
}

#[test]
fn test_repeat_reads_skip_checkout() {
    two_versions("repeat_reads_skip_checkout")
        .reads("v5.0", "/README")
        .assert_generation(1)
        .reads("v5.0", "/init/main.c")
        .assert_generation(1)
        .assert_head("v5.0")
        .run()
        .unwrap();
}

#[test]
fn test_parallel_readers_of_current_version_need_no_checkout() {
    two_versions("parallel_readers_of_current_version")
        .assert_concurrent_reads(
            &[
                ("v5.1", "/README", "Linux 5.1\n"),
                ("v5.1", "/README", "Linux 5.1\n"),
                ("v5.1", "/README", "Linux 5.1\n"),
            ],
            5,
        )
        .assert_generation(0)
        .assert_head("v5.1")
        .run()
        .unwrap();
}

#[test]
fn test_restart_adopts_current_checkout() {
    two_versions("restart_adopts_current_checkout")
        .reads("v5.0", "/README")
        .restart()
        .assert_generation(0)
        .assert_head("v5.0")
        .assert_file("v5.0", "/README", "Linux 5.0\n")
        .assert_generation(0)
        .run()
        .unwrap();
}
