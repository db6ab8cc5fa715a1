// build.rs -- Compile the ICU4C shim (gated on `icu` feature)

fn main() {
    #[cfg(feature = "icu")]
    build_icu_shim();
}

#[cfg(feature = "icu")]
fn build_icu_shim() {
    use std::env;
    use std::path::PathBuf;

    println!("cargo:rerun-if-changed=csrc/icu_shim.c");
    println!("cargo:rerun-if-env-changed=ICU_ROOT");

    let mut build = cc::Build::new();
    build.file("csrc/icu_shim.c").warnings(false);

    // A non-system ICU install: headers in include/, libraries in lib/.
    if let Ok(root) = env::var("ICU_ROOT") {
        let root = PathBuf::from(root);
        build.include(root.join("include"));
        println!("cargo:rustc-link-search=native={}", root.join("lib").display());
    }

    build.compile("ferrocoll_icu_shim");

    println!("cargo:rustc-link-lib=icui18n");
    println!("cargo:rustc-link-lib=icuuc");
}
