use anyhow::Context;
use heartrisk::pipeline::PipelineConfig;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    const RUNS_FILEPATH: &str = "data/personal_heartrate.csv";
    const READINGS_FILEPATH: &str = "data/heart_rate_temperature.csv";
    const MODEL_FILEPATH: &str = "data/hr_temperature_model.json";

    PipelineConfig::severe_run()
        .run(RUNS_FILEPATH)
        .with_context(|| format!("severe-run training failed on {RUNS_FILEPATH}"))?;

    PipelineConfig::heart_rate_temperature(MODEL_FILEPATH)
        .run(READINGS_FILEPATH)
        .with_context(|| format!("hr-temperature training failed on {READINGS_FILEPATH}"))?;

    Ok(())
}
