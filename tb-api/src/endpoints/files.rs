//! File metadata endpoint.

use tb_core::error::BotResult;
use tb_models::FileInfo;

use crate::client::ApiClient;
use crate::request::Params;

impl ApiClient {
    /// Get the type, size, name, and download URL of a stored file.
    pub async fn get_file_info(&self, file_id: &str) -> BotResult<FileInfo> {
        let params = Params::new().with("fileId", file_id);
        let mut info: FileInfo = self
            .dispatch("/files/getInfo", params, None)
            .await?
            .decode()?;
        if info.file_id.is_empty() {
            info.file_id = file_id.to_string();
        }
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{scripted_client, ScriptedTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_get_file_info() {
        let transport = ScriptedTransport::new();
        transport.push_json(json!({
            "ok": true,
            "type": "video",
            "size": 20971520,
            "filename": "VIDEO.mkv",
            "url": "https://example.com/get/0dC7"
        }));
        let client = scripted_client(transport.clone());

        let info = client.get_file_info("0dC7").await.unwrap();
        assert_eq!(info.file_id, "0dC7");
        assert_eq!(info.filename, "VIDEO.mkv");
        assert_eq!(transport.requests()[0].params.get("fileId"), Some("0dC7"));
    }
}
