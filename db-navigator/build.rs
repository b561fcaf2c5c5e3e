use std::fs;
use std::path::Path;

fn main() {
    // include_dir! does not register the embedded files with cargo, so track
    // them here to rebuild when a stylesheet or script changes
    println!("cargo:rerun-if-changed=static");
    track_directory(Path::new("static"));
}

fn track_directory(path: &Path) {
    let Ok(entries) = fs::read_dir(path) else {
        println!("cargo:warning=Static directory {} not found", path.display());
        return;
    };

    for entry in entries.flatten() {
        let entry_path = entry.path();
        if entry_path.is_dir() {
            track_directory(&entry_path);
        } else {
            println!("cargo:rerun-if-changed={}", entry_path.display());
        }
    }
}
