fn main() -> Result<(), Box<dyn std::error::Error>> {
    lakeforge_cli::runner::main(std::env::args().collect())
}
