fn main() -> anyhow::Result<()> {
    castellan::app::run()
}
