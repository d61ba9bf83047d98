pub mod data_api;
pub mod models;
pub mod selection;
pub mod traits;
pub mod ytdlp;

pub use data_api::{extract_video_id, DataApiClient};
pub use models::{Format, VideoInfo};
pub use selection::select_best_audio_format;
pub use traits::{ByteStream, Extractor};
pub use ytdlp::YtDlpExtractor;
