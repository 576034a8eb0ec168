#[cfg(test)]
#[path = "gallery_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::path;

use anyhow::bail;
use anyhow::Result;
use chrono::Local;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::models::Framework;

const METADATA_FILE: &str = "gallery.json";
const MAX_FEATURES: usize = 6;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GalleryMetadata {
    pub title: String,
    pub description: String,
    pub framework: String,
    pub difficulty: String,
    pub features: Vec<String>,
    pub query: String,
    #[serde(default)]
    pub config_ideas: String,
    #[serde(default)]
    pub generation_plan: String,
    #[serde(default)]
    pub user_generated: bool,
}

#[derive(Clone, Debug)]
pub struct GalleryEntry {
    pub filename: String,
    pub metadata: GalleryMetadata,
}

/// A directory of example simulation scripts plus one JSON metadata file.
/// Scripts found on disk without a metadata entry get a synthesized one on
/// the next listing, so hand-copied files show up too.
pub struct Gallery {
    pub gallery_dir: path::PathBuf,
}

impl Default for Gallery {
    fn default() -> Gallery {
        let gallery_dir = dirs::data_dir().unwrap().join("simforge/gallery");

        return Gallery::new(gallery_dir);
    }
}

impl Gallery {
    pub fn new(gallery_dir: path::PathBuf) -> Gallery {
        return Gallery { gallery_dir };
    }

    fn metadata_path(&self) -> path::PathBuf {
        return self.gallery_dir.join(METADATA_FILE);
    }

    async fn load_metadata(&self) -> Result<BTreeMap<String, GalleryMetadata>> {
        let metadata_path = self.metadata_path();
        if !metadata_path.exists() {
            return Ok(BTreeMap::new());
        }

        let payload = fs::read_to_string(metadata_path).await?;
        let metadata: BTreeMap<String, GalleryMetadata> = serde_json::from_str(&payload)?;

        return Ok(metadata);
    }

    async fn save_metadata(&self, metadata: &BTreeMap<String, GalleryMetadata>) -> Result<()> {
        if !self.gallery_dir.exists() {
            fs::create_dir_all(&self.gallery_dir).await?;
        }

        let payload = serde_json::to_string_pretty(metadata)?;
        let mut file = fs::File::create(self.metadata_path()).await?;
        file.write_all(payload.as_bytes()).await?;

        return Ok(());
    }

    /// Lists every script in the gallery, synthesizing metadata for
    /// scripts that have none.
    pub async fn list(&self) -> Result<Vec<GalleryEntry>> {
        let mut metadata = self.load_metadata().await?;
        if !self.gallery_dir.exists() {
            return Ok(vec![]);
        }

        let mut synthesized = false;
        let mut dir = fs::read_dir(&self.gallery_dir).await?;
        while let Some(file) = dir.next_entry().await? {
            let filename = file.file_name().to_string_lossy().to_string();
            if !filename.ends_with(".py") || metadata.contains_key(&filename) {
                continue;
            }

            metadata.insert(filename.clone(), default_metadata(&filename));
            synthesized = true;
        }

        if synthesized {
            self.save_metadata(&metadata).await?;
        }

        let entries = metadata
            .into_iter()
            .map(|(filename, metadata)| {
                return GalleryEntry { filename, metadata };
            })
            .collect();

        return Ok(entries);
    }

    pub async fn load_code(&self, filename: &str) -> Result<String> {
        let code_path = self.gallery_dir.join(filename);
        if !code_path.exists() {
            bail!(format!("No gallery example found for {filename}"));
        }

        return Ok(fs::read_to_string(code_path).await?);
    }

    /// Adds a generated script to the gallery and returns its filename.
    #[allow(clippy::too_many_arguments)]
    pub async fn add(
        &self,
        query: &str,
        config_ideas: &str,
        generation_plan: &str,
        code: &str,
        framework: Framework,
        title: Option<&str>,
        description: Option<&str>,
        difficulty: Option<&str>,
    ) -> Result<String> {
        let slug = match title {
            Some(text) => slugify(text, usize::MAX),
            None => slugify(query, 3),
        };
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{slug}_{timestamp}.py");

        if !self.gallery_dir.exists() {
            fs::create_dir_all(&self.gallery_dir).await?;
        }

        let mut file = fs::File::create(self.gallery_dir.join(&filename)).await?;
        file.write_all(code.as_bytes()).await?;

        let title = match title {
            Some(text) => text.to_string(),
            None => default_title(query),
        };
        let description = match description {
            Some(text) => text.to_string(),
            None => first_sentence(config_ideas, query),
        };

        let mut metadata = self.load_metadata().await?;
        metadata.insert(
            filename.clone(),
            GalleryMetadata {
                title,
                description,
                framework: framework.library_name().to_string(),
                difficulty: difficulty.unwrap_or("Intermediate").to_string(),
                features: extract_features(config_ideas, generation_plan),
                query: query.to_string(),
                config_ideas: config_ideas.to_string(),
                generation_plan: generation_plan.to_string(),
                user_generated: true,
            },
        );
        self.save_metadata(&metadata).await?;

        return Ok(filename);
    }

    /// Removes a user-generated example. Synthesized and shipped entries
    /// stay.
    pub async fn delete(&self, filename: &str) -> Result<()> {
        let mut metadata = self.load_metadata().await?;
        let entry = match metadata.get(filename) {
            Some(entry) => entry,
            None => bail!(format!("No gallery example found for {filename}")),
        };
        if !entry.user_generated {
            bail!(format!("{filename} is not a user-generated example and cannot be deleted"));
        }

        metadata.remove(filename);
        self.save_metadata(&metadata).await?;

        let code_path = self.gallery_dir.join(filename);
        if code_path.exists() {
            fs::remove_file(code_path).await?;
        }

        return Ok(());
    }
}

/// Pulls display features out of the free-text ideas and plan by keyword.
pub fn extract_features(config_ideas: &str, generation_plan: &str) -> Vec<String> {
    let combined = format!("{config_ideas} {generation_plan}").to_lowercase();

    let keywords = [
        ("interactive", "Interactive controls"),
        ("slider", "Interactive sliders"),
        ("physics", "Physics simulation"),
        ("collision", "Collision detection"),
        ("particle", "Particle system"),
        ("gravity", "Gravity effects"),
        ("force", "Force visualization"),
        ("energy", "Energy calculations"),
        ("vector", "Vector visualization"),
        ("friction", "Friction effects"),
        ("momentum", "Momentum conservation"),
        ("real-time", "Real-time updates"),
        ("3d", "3D graphics"),
        ("animation", "Animation effects"),
        ("ui", "User interface"),
        ("control", "User controls"),
        ("simulation", "Simulation engine"),
        ("visualization", "Data visualization"),
    ];

    let features = keywords
        .iter()
        .filter(|(keyword, _)| return combined.contains(keyword))
        .map(|(_, feature)| return feature.to_string())
        .take(MAX_FEATURES)
        .collect::<Vec<String>>();

    if features.is_empty() {
        return vec![
            "Custom simulation".to_string(),
            "Interactive features".to_string(),
        ];
    }

    return features;
}

fn default_title(query: &str) -> String {
    let words = query
        .split_whitespace()
        .take(4)
        .map(|word| {
            let mut chars = word.chars();
            return match chars.next() {
                Some(first) => first.to_uppercase().to_string() + chars.as_str(),
                None => "".to_string(),
            };
        })
        .collect::<Vec<String>>()
        .join(" ");

    return format!("{words} Simulation");
}

fn first_sentence(config_ideas: &str, query: &str) -> String {
    if config_ideas.is_empty() {
        return query.to_string();
    }

    return config_ideas
        .split('.')
        .next()
        .unwrap_or(query)
        .trim()
        .to_string();
}

fn slugify(text: &str, max_words: usize) -> String {
    return text
        .to_lowercase()
        .split_whitespace()
        .take(max_words)
        .map(|word| {
            return word
                .chars()
                .filter(|c| return c.is_alphanumeric())
                .collect::<String>();
        })
        .filter(|word| return !word.is_empty())
        .collect::<Vec<String>>()
        .join("_");
}

fn default_metadata(filename: &str) -> GalleryMetadata {
    let stem = filename.trim_end_matches(".py").replace('_', " ");

    return GalleryMetadata {
        title: default_title(&stem),
        description: format!("Physics simulation example: {stem}."),
        framework: Framework::PyGame.library_name().to_string(),
        difficulty: "Intermediate".to_string(),
        features: vec![
            "Custom simulation".to_string(),
            "Interactive features".to_string(),
        ],
        query: stem,
        config_ideas: "".to_string(),
        generation_plan: "".to_string(),
        user_generated: false,
    };
}
