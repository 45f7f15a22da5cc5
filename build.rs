fn main(){
    println!("cargo:rerun-if-changed=src/ffi/mod.rs");

    let crate_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let include_dir = std::path::Path::new(&crate_dir).join("include");
    std::fs::create_dir_all(&include_dir).expect("Unable to create include dir");

    let mut config = cbindgen::Config::default();
    config.language = cbindgen::Language::C;
    config.include_guard = Some("ROV_SYNC_H".to_string());

    cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_config(config)
        .generate()
        .expect("Unable to generate bindings")
        .write_to_file(include_dir.join("rov_sync.h"));
}
