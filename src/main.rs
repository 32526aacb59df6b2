fn main() -> Result<(), eframe::Error> {
    photowall::run_frontend()
}
