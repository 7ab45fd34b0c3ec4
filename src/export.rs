//! Export driver
//!
//! Walks an [`AudioAsset`] and produces one artifact set: samples first (in
//! pool key order), then soundfonts and sequences in table order.

use crate::archive::ArtifactSet;
use crate::codec::{sample, sequence, soundfont};
use crate::error::{Error, Result};
use crate::model::enums::{cache_policy_label, codec_label, medium_label, ERROR_LABEL};
use crate::model::AudioAsset;
use crate::names::{join_path, ReferenceResolver, META_SUFFIX, RAW_SUFFIX};
use crate::resource::{BinaryWriter, ResourceHeader, ResourceType, ResourceVersions};

/// Directory under the root holding soundfont artifacts
pub const FONTS_DIR: &str = "fonts";

/// Directory under the root holding sequence metadata
pub const SEQUENCES_DIR: &str = "sequences";

/// Directory under the root holding raw sequence bytes
pub const SEQUENCE_DATA_DIR: &str = "sequencedata";

/// Name of the header-only root audio resource, under the root
pub const ROOT_ARTIFACT_NAME: &str = "audio";

/// Encoding used for metadata artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// XML metadata with payloads in sibling `_RAW` artifacts
    #[default]
    Xml,
    /// Versioned binary resources with payloads inline
    Binary,
}

/// Settings for one export run
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Prefix of every artifact path and sample reference
    pub root: String,
    pub format: ExportFormat,
    pub versions: ResourceVersions,
    /// Fail on slots pointing at samples missing from the pool
    pub strict_references: bool,
    /// Name of the header-only root audio resource under `root`, or `None`
    /// to leave it out
    pub root_artifact: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            root: "audio".to_string(),
            format: ExportFormat::default(),
            versions: ResourceVersions::default(),
            strict_references: true,
            root_artifact: Some(ROOT_ARTIFACT_NAME.to_string()),
        }
    }
}

pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Encode every sample, soundfont and sequence of `asset`
    pub fn export(&self, asset: &AudioAsset) -> Result<ArtifactSet> {
        if self.config.strict_references {
            check_references(asset)?;
        }

        let resolver = ReferenceResolver::new(&asset.sample_names, &self.config.root);
        let mut artifacts = ArtifactSet::new();

        if let Some(name) = &self.config.root_artifact {
            let mut writer = BinaryWriter::new();
            self.header(ResourceType::Audio).write(&mut writer);
            artifacts.insert(join_path(&self.config.root, name), writer.into_bytes())?;
        }

        self.export_samples(asset, &resolver, &mut artifacts)?;
        self.export_sound_fonts(asset, &resolver, &mut artifacts)?;
        self.export_sequences(asset, &mut artifacts)?;

        log::info!(
            "exported {} samples, {} soundfonts, {} sequences as {} artifacts",
            asset.samples.len(),
            asset.sound_fonts.len(),
            asset.sequences.len(),
            artifacts.len()
        );
        Ok(artifacts)
    }

    fn header(&self, resource: ResourceType) -> ResourceHeader {
        ResourceHeader::new(resource, self.config.versions.get(resource))
    }

    fn version(&self, resource: ResourceType) -> u32 {
        self.config.versions.get(resource)
    }

    fn export_samples(
        &self,
        asset: &AudioAsset,
        resolver: &ReferenceResolver,
        artifacts: &mut ArtifactSet,
    ) -> Result<()> {
        for (&key, entry) in asset.samples.iter() {
            let name = resolver.resolve(key);
            warn_unmapped("sample", &name, "codec", entry.codec, codec_label);
            warn_unmapped("sample", &name, "medium", entry.medium, medium_label);

            // The metadata lives exactly where soundfont references point
            let meta_path = resolver.meta_reference(key);
            match self.config.format {
                ExportFormat::Xml => {
                    let raw_path = resolver.artifact_path(&resolver.raw_data(key));
                    let meta = sample::encode_xml(entry, &raw_path).to_bytes()?;
                    artifacts.insert(meta_path, meta)?;
                    artifacts.insert(raw_path, entry.data.clone())?;
                }
                ExportFormat::Binary => {
                    let bytes =
                        sample::encode_binary(entry, self.version(ResourceType::AudioSample));
                    artifacts.insert(meta_path, bytes)?;
                }
            }
        }
        Ok(())
    }

    fn export_sound_fonts(
        &self,
        asset: &AudioAsset,
        resolver: &ReferenceResolver,
        artifacts: &mut ArtifactSet,
    ) -> Result<()> {
        for (index, named) in asset.sound_fonts.iter().enumerate() {
            let font = &named.value;
            warn_unmapped("soundfont", &named.name, "medium", font.medium, medium_label);
            warn_unmapped(
                "soundfont",
                &named.name,
                "cache policy",
                font.cache_policy,
                cache_policy_label,
            );

            let resolved =
                font.try_map_samples(|&key| Ok::<_, Error>(resolver.meta_reference(key)))?;
            let index = index as u32;
            let path = join_path(
                &self.config.root,
                &format!("{}/{}", FONTS_DIR, named.name),
            );
            let bytes = match self.config.format {
                ExportFormat::Xml => soundfont::encode_xml(index, &resolved).to_bytes()?,
                ExportFormat::Binary => soundfont::encode_binary(
                    index,
                    &resolved,
                    self.version(ResourceType::AudioSoundFont),
                ),
            };
            artifacts.insert(path, bytes)?;
        }
        Ok(())
    }

    fn export_sequences(&self, asset: &AudioAsset, artifacts: &mut ArtifactSet) -> Result<()> {
        for (position, named) in asset.sequences.iter().enumerate() {
            let seq = &named.value;
            warn_unmapped("sequence", &named.name, "medium", seq.medium, medium_label);
            warn_unmapped(
                "sequence",
                &named.name,
                "cache policy",
                seq.cache_policy,
                cache_policy_label,
            );

            let index =
                u8::try_from(position).map_err(|_| Error::SequenceIndexOverflow(position))?;
            match self.config.format {
                ExportFormat::Xml => {
                    let meta_path = join_path(
                        &self.config.root,
                        &format!("{}/{}{}", SEQUENCES_DIR, named.name, META_SUFFIX),
                    );
                    let raw_path = join_path(
                        &self.config.root,
                        &format!("{}/{}{}", SEQUENCE_DATA_DIR, named.name, RAW_SUFFIX),
                    );
                    let meta = sequence::encode_xml(index, seq, &raw_path).to_bytes()?;
                    artifacts.insert(meta_path, meta)?;
                    artifacts.insert(raw_path, seq.data.clone())?;
                }
                ExportFormat::Binary => {
                    let path = join_path(
                        &self.config.root,
                        &format!("{}/{}", SEQUENCES_DIR, named.name),
                    );
                    let bytes = sequence::encode_binary(
                        index,
                        seq,
                        self.version(ResourceType::AudioSequence),
                    );
                    artifacts.insert(path, bytes)?;
                }
            }
        }
        Ok(())
    }
}

/// Every slot must point into the sample pool
fn check_references(asset: &AudioAsset) -> Result<()> {
    for named in &asset.sound_fonts {
        if let Some(key) = named
            .value
            .sample_refs()
            .find(|key| !asset.samples.contains(key))
        {
            return Err(Error::DanglingSample {
                bank_id: key.bank_id,
                offset: key.offset,
            });
        }
    }
    Ok(())
}

fn warn_unmapped(resource: &str, name: &str, field: &str, code: u8, label: fn(u8) -> &'static str) {
    if label(code) == ERROR_LABEL {
        log::warn!(
            "{} '{}' has unknown {} code {}, text output will show {}",
            resource,
            name,
            field,
            code,
            ERROR_LABEL
        );
    }
}
