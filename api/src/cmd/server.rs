use project_board_api::{
    config::Config,
    tracing_config::{self, HoneycombConfig},
};

pub async fn run(mut config: Config) -> Result<(), eyre::Report> {
    let honeycomb_config = config.honeycomb_team.take().map(|team| HoneycombConfig {
        team,
        dataset: std::mem::take(&mut config.honeycomb_dataset),
    });

    let production = config.env != "development" && !cfg!(debug_assertions);
    tracing_config::configure("project-board", production, honeycomb_config)?;

    let server = project_board_api::create_server(config).await?;
    let result = server.run().await;

    tracing_config::teardown();

    result
}
