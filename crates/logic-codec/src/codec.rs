//! The Codec: one entry point for manifests, calldata and interactions.

use logic_codec_core::{Result, Value};
use logic_codec_interaction::{Canonicalizer, ProcessedInteraction, RawInteraction};
use logic_codec_manifest::{Exception, Manifest, ManifestCoder, RoutineRef};

use crate::config::CodecConfig;

/// A manifest coder and an interaction canonicalizer sharing one
/// configuration.
#[derive(Debug)]
pub struct Codec {
    coder: ManifestCoder,
    canonicalizer: Canonicalizer,
    config: CodecConfig,
}

impl Codec {
    /// Create a codec for a manifest with the default configuration.
    pub fn new(manifest: Manifest) -> Self {
        Self::with_config(manifest, CodecConfig::default())
    }

    pub fn with_config(manifest: Manifest, config: CodecConfig) -> Self {
        Self {
            coder: ManifestCoder::with_config(manifest, config.coder_config()),
            canonicalizer: Canonicalizer::with_config(config.id_layout),
            config,
        }
    }

    /// Create a codec from a manifest in JSON form.
    pub fn from_json(json: &str, config: CodecConfig) -> Result<Self> {
        Ok(Self::with_config(Manifest::from_json(json)?, config))
    }

    /// Create a codec from a packed manifest.
    pub fn from_encoded(encoded: &str, config: CodecConfig) -> Result<Self> {
        Ok(Self::with_config(
            ManifestCoder::decode_manifest(encoded)?,
            config,
        ))
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn coder(&self) -> &ManifestCoder {
        &self.coder
    }

    pub fn manifest(&self) -> &Manifest {
        self.coder.manifest()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Manifest
    // ─────────────────────────────────────────────────────────────────────────

    /// The packed form of this codec's manifest.
    pub fn encode_manifest(&self) -> Result<String> {
        ManifestCoder::encode_manifest(self.coder.manifest())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Routines and events
    // ─────────────────────────────────────────────────────────────────────────

    pub fn encode_arguments(&self, routine: impl Into<RoutineRef>, args: &[Value]) -> Result<String> {
        self.coder.encode_arguments(routine, args)
    }

    pub fn decode_arguments(
        &self,
        routine: impl Into<RoutineRef>,
        calldata: &str,
    ) -> Result<Option<Vec<Value>>> {
        self.coder.decode_arguments(routine, calldata)
    }

    pub fn decode_output(&self, routine: impl Into<RoutineRef>, output: &str) -> Result<Option<Value>> {
        self.coder.decode_output(routine, output)
    }

    pub fn decode_event_output(&self, event: &str, log: &str) -> Result<Option<Value>> {
        self.coder.decode_event_output(event, log)
    }

    pub fn decode_exception(&self, error: &str) -> Result<Option<Exception>> {
        ManifestCoder::decode_exception(error)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Interactions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn canonicalize(&self, raw: &RawInteraction) -> Result<ProcessedInteraction> {
        self.canonicalizer.canonicalize(raw)
    }

    /// Canonicalize and encode an interaction, producing the bytes to sign.
    pub fn interaction_bytes(&self, raw: &RawInteraction) -> Result<Vec<u8>> {
        let bytes = self.canonicalizer.interaction_bytes(raw)?;
        tracing::debug!(len = bytes.len(), "encoded interaction");
        Ok(bytes)
    }
}
