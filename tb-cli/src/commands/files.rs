//! File info command.

use tb_core::config::BotConfig;
use tb_core::error::BotResult;

use crate::OutputFormat;

pub async fn run(mut config: BotConfig, file_id: String, format: OutputFormat) -> BotResult<()> {
    let api = super::create_api_client(&mut config)?;
    let file = api.get_file_info(&file_id).await?;

    match format {
        OutputFormat::Json => super::print_json(&file),
        OutputFormat::Text => {
            println!("File:     {}", file.file_id);
            println!("Name:     {}", file.filename);
            println!("Type:     {}", file.file_type);
            println!("Size:     {}", super::format_bytes(file.size));
            println!("URL:      {}", file.url);
        }
    }
    Ok(())
}
