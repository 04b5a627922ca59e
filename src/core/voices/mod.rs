//! Read-only voice catalogs.
//!
//! Each engine ships a static catalog: two parallel slices of voice
//! identifiers and display names. The slices are assumed equal length; a
//! mismatch yields an empty list rather than a partial or misaligned one.

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use crate::core::engine::{qwen3, seed_tts2, EngineDescriptor};

/// One selectable voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceInfo {
    pub voice_id: String,
    pub display_name: String,
}

/// Read-only catalog of selectable voices for an engine.
#[async_trait]
pub trait VoiceRepository: Send + Sync {
    /// Voices offered for the given engine. Unknown engines yield an empty
    /// list.
    async fn voices_for_engine(&self, engine: &EngineDescriptor) -> Vec<VoiceInfo>;
}

/// Static parallel-slice catalog.
struct VoiceCatalog {
    voice_ids: &'static [&'static str],
    display_names: &'static [&'static str],
}

impl VoiceCatalog {
    fn voices(&self) -> Vec<VoiceInfo> {
        if self.voice_ids.len() != self.display_names.len() {
            warn!(
                "voice catalog: id/name length mismatch ({} vs {}), returning empty list",
                self.voice_ids.len(),
                self.display_names.len()
            );
            return Vec::new();
        }
        self.voice_ids
            .iter()
            .zip(self.display_names.iter())
            .map(|(voice_id, display_name)| VoiceInfo {
                voice_id: (*voice_id).to_string(),
                display_name: (*display_name).to_string(),
            })
            .collect()
    }
}

const SEED_TTS2_CATALOG: VoiceCatalog = VoiceCatalog {
    voice_ids: &[
        "zh_female_tianmeitaozi_mars_bigtts",
        "zh_female_cancan_mars_bigtts",
        "zh_female_qingxinnvsheng_mars_bigtts",
        "zh_female_shuangkuaisisi_moon_bigtts",
        "zh_male_wennuanahu_moon_bigtts",
    ],
    display_names: &["甜美桃子", "灿灿", "清新女声", "爽快思思", "温暖阿虎"],
};

const QWEN3_CATALOG: VoiceCatalog = VoiceCatalog {
    voice_ids: &["Cherry", "Serena", "Ethan", "Chelsie"],
    display_names: &["芊悦 (Cherry)", "苏瑶 (Serena)", "晨煦 (Ethan)", "千雪 (Chelsie)"],
};

/// Voice catalog for the Seed TTS 2.0 engine.
pub struct SeedTts2VoiceRepository;

impl SeedTts2VoiceRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SeedTts2VoiceRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoiceRepository for SeedTts2VoiceRepository {
    async fn voices_for_engine(&self, engine: &EngineDescriptor) -> Vec<VoiceInfo> {
        if engine.id != seed_tts2::ENGINE_ID {
            return Vec::new();
        }
        SEED_TTS2_CATALOG.voices()
    }
}

/// Voice catalog for the Qwen3 TTS engine.
pub struct Qwen3VoiceRepository;

impl Qwen3VoiceRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Qwen3VoiceRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoiceRepository for Qwen3VoiceRepository {
    async fn voices_for_engine(&self, engine: &EngineDescriptor) -> Vec<VoiceInfo> {
        if engine.id != qwen3::ENGINE_ID {
            return Vec::new();
        }
        QWEN3_CATALOG.voices()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str) -> EngineDescriptor {
        EngineDescriptor {
            id: id.to_string(),
            name: "Test".to_string(),
            provider: "Test".to_string(),
        }
    }

    #[tokio::test]
    async fn seed_catalog_pairs_ids_with_names() {
        let repo = SeedTts2VoiceRepository::new();
        let voices = repo
            .voices_for_engine(&descriptor(seed_tts2::ENGINE_ID))
            .await;
        assert_eq!(voices.len(), 5);
        assert_eq!(voices[1].voice_id, "zh_female_cancan_mars_bigtts");
        assert_eq!(voices[1].display_name, "灿灿");
    }

    #[tokio::test]
    async fn qwen_catalog_pairs_ids_with_names() {
        let repo = Qwen3VoiceRepository::new();
        let voices = repo.voices_for_engine(&descriptor(qwen3::ENGINE_ID)).await;
        assert_eq!(voices.len(), 4);
        assert_eq!(voices[0].voice_id, "Cherry");
    }

    #[tokio::test]
    async fn unknown_engine_yields_empty_list() {
        let repo = SeedTts2VoiceRepository::new();
        let voices = repo.voices_for_engine(&descriptor("elsewhere")).await;
        assert!(voices.is_empty());
    }

    #[test]
    fn mismatched_catalog_yields_empty_list() {
        let catalog = VoiceCatalog {
            voice_ids: &["a", "b"],
            display_names: &["only one"],
        };
        assert!(catalog.voices().is_empty());
    }
}
