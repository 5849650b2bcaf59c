fn main() {
    if let Err(e) = chestcare_lib::run() {
        eprintln!("chestcare: {e}");
        std::process::exit(1);
    }
}
