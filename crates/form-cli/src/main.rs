fn main() -> anyhow::Result<()> {
    form_cli::cli::main()
}
