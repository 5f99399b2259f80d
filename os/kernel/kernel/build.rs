use kernel_info::memory;
use std::{env, path::PathBuf};

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let ld = manifest_dir.join("kernel.ld");

    // The boot loader maps the kernel right after the environment page.
    let boot_info = memory::BOOT_INFO_BASE;
    let environment = memory::ENVIRONMENT_BASE;
    let kernel_base = memory::KERNEL_BASE;
    assert_eq!(
        environment,
        boot_info + 0x1000,
        "environment must follow the boot info page (got {environment:#x})"
    );
    assert_eq!(
        kernel_base & 0xfff,
        0,
        "KERNEL_BASE must be 4 KiB aligned (got {kernel_base:#x})"
    );

    println!("cargo:rerun-if-changed={}", ld.display());

    // Host builds (tests) link normally.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("none") {
        return;
    }

    println!("cargo:rustc-link-arg-bins=-T{}", ld.display());
    println!("cargo:rustc-link-arg-bins=--defsym=KERNEL_BASE={kernel_base:#x}");
    println!("cargo:rustc-link-arg-bins=--defsym=bootboot={boot_info:#x}");
    println!("cargo:rustc-link-arg-bins=--defsym=environment={environment:#x}");
    println!(
        "cargo:rustc-link-arg-bins=--defsym=initstack={:#x}",
        memory::INIT_STACK_SIZE
    );
}
