//! Show or change settings

use writing_goals::{GoalEngine, GoalError, Result, VaultContext};

use super::render;

pub fn run(ctx: &VaultContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let mut engine = GoalEngine::open(ctx.open_vault()?)?;

    let settings = serde_json::to_value(engine.settings())?;
    match (key, value) {
        (None, _) => render::json(&settings),
        (Some(key), None) => match settings.get(&key) {
            Some(value) => render::json(value),
            None => Err(GoalError::InvalidSetting {
                key,
                reason: "unknown setting".to_string(),
            }),
        },
        (Some(key), Some(value)) => {
            engine.update_setting(&key, &value)?;
            render::notices(&mut engine);
            eprintln!("Set {} = {}", key, value);
            Ok(())
        }
    }
}
