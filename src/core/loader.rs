use crate::core::{InputEntry, Record, Storage};
use crate::utils::error::{EtlError, Result};
use serde_json::Value;

/// 讀取輸入檔並解析成記錄陣列。檔案、JSON 或頂層格式有問題是致命錯誤；
/// 非物件的元素保留位置，交給逐筆處理時記為失敗
pub async fn load_records<S: Storage>(storage: &S, path: &str) -> Result<Vec<InputEntry>> {
    let input_error = |message: String| EtlError::InputFormatError {
        path: path.to_string(),
        message,
    };

    let bytes = storage
        .read_file(path)
        .await
        .map_err(|e| input_error(format!("cannot read file: {}", e)))?;

    let parsed: Value =
        serde_json::from_slice(&bytes).map_err(|e| input_error(format!("invalid JSON: {}", e)))?;

    let Value::Array(items) = parsed else {
        return Err(input_error("top-level value must be a JSON array".to_string()));
    };

    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::Object(data) => InputEntry::Record(Record::new(data)),
            other => InputEntry::NotAnObject {
                found: json_kind(&other),
            },
        })
        .collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
