//! Info command - show the bot's identity.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use console::style;

use tb_core::config::BotConfig;
use tb_core::error::BotResult;

use crate::OutputFormat;

pub async fn run(mut config: BotConfig, format: OutputFormat) -> BotResult<()> {
    let api = super::create_api_client(&mut config)?;
    let info = api.get_info().await?;

    match format {
        OutputFormat::Json => super::print_json(&info),
        OutputFormat::Text => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS);
            table.add_row(vec!["User ID", info.user_id.as_str()]);
            table.add_row(vec!["Nick", info.nick.as_str()]);
            table.add_row(vec!["Name", info.first_name.as_str()]);
            table.add_row(vec!["About", info.about.as_str()]);
            if let Some(photo) = info.photo.first() {
                table.add_row(vec!["Photo", photo.url.as_str()]);
            }
            println!("{} {}", style("Bot").bold(), api.base_url());
            println!("{table}");
        }
    }
    Ok(())
}
