pub mod audio;
pub mod dialin;
pub mod tts;

pub use audio::{AudioError, AudioNormalizer, ChunkingPolicy};
pub use dialin::{
    CallForwarder, DialinSession, RoomDetails, RoomProvisioner, SessionHandle, TelephonyError,
    TransportEvent,
};
pub use tts::{
    AudioCallback, AudioData, BaseTTS, BhashiniTTS, BoxedTTS, ConnectionState, TTSConfig, TTSError,
    TTSResult, create_tts_provider,
};
