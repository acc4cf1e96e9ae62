fn main() -> anyhow::Result<()> {
    doughdetective_cli::run(std::env::args())
}
