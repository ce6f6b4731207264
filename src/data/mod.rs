mod upload;

pub use upload::{
    UploadError, UploadKind, ingest, ingest_text, load_questions_from_path, parse_questions_json,
};
