use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=AGROMIND_NODE_CONFIG");
    println!("cargo:rerun-if-env-changed=WIFI_SSID");
    println!("cargo:rerun-if-env-changed=WIFI_PASS");
    println!("cargo:rerun-if-env-changed=UPLINK_URL");

    // Deployment document embedded by the binary; empty means defaults.
    let doc = match std::env::var("AGROMIND_NODE_CONFIG") {
        Ok(path) if !path.is_empty() => {
            println!("cargo:rerun-if-changed={path}");
            std::fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("AGROMIND_NODE_CONFIG={path}: {e}"))
        }
        _ => String::new(),
    };
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR set by cargo"));
    std::fs::write(out_dir.join("node_config.json"), doc).expect("write node_config.json");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
