use anyhow::Context;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = runway::default().context("failed to start runway")?;
    app.run().context("event loop exited with an error")
}
