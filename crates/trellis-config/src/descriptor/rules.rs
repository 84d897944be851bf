//! Asset-processing rules: which loader chain handles which files.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::descriptor::naming::OutputNaming;
use crate::error::Result;
use crate::mode::BuildMode;

/// Category of source file a rule handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Script,
    Style,
    Font,
    Image,
}

/// One loader invocation inside a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderStep {
    pub loader: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub options: Value,
}

impl LoaderStep {
    pub fn new(loader: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            options: Value::Null,
        }
    }

    pub fn with_options(loader: impl Into<String>, options: Value) -> Self {
        Self {
            loader: loader.into(),
            options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRule {
    pub kind: AssetKind,
    /// Regular expression matched against the module path
    pub test: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
    /// Loaders, applied last to first
    pub loaders: Vec<LoaderStep>,
    /// Whether matching files produce output in this bundle
    #[serde(default = "default_emit")]
    pub emit: bool,
}

fn default_emit() -> bool {
    true
}

impl AssetRule {
    pub fn has_loader(&self, loader: &str) -> bool {
        self.loaders.iter().any(|step| step.loader == loader)
    }

    pub fn loader(&self, loader: &str) -> Option<&LoaderStep> {
        self.loaders.iter().find(|step| step.loader == loader)
    }
}

const SCRIPT_TEST: &str = r"\.(js|jsx)$";
pub(crate) const STYLE_TEST: &str = r"\.(css|scss)$";
const FONT_TEST: &str = r"\.(woff2?|eot|ttf|otf)$";
const IMAGE_TEST: &str = r"\.(png|jpe?g|gif|svg)$";

/// Lossy/lossless image compression settings for production builds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageOptimization {
    pub mozjpeg: JpegOptions,
    pub pngquant: PngOptions,
    pub gifsicle: GifOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JpegOptions {
    pub quality: u8,
    pub progressive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PngOptions {
    /// Minimum and maximum quantization quality
    pub quality: (f64, f64),
    pub speed: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GifOptions {
    pub interlaced: bool,
    #[serde(rename = "optimizationLevel")]
    pub optimization_level: u8,
}

impl Default for ImageOptimization {
    fn default() -> Self {
        Self {
            mozjpeg: JpegOptions {
                quality: 95,
                progressive: true,
            },
            pngquant: PngOptions {
                quality: (0.9, 1.0),
                speed: 4,
            },
            gifsicle: GifOptions {
                interlaced: true,
                optimization_level: 2,
            },
        }
    }
}

/// Rules for the browser bundle.
pub fn client_rules(mode: BuildMode, naming: &OutputNaming) -> Vec<AssetRule> {
    let dev = mode.is_development();

    let style_head = if dev {
        LoaderStep::new("style-loader")
    } else {
        LoaderStep::new("extract-css-loader")
    };
    let local_ident = if dev { "[name]__[local]" } else { "[hash:base64:8]" };

    let mut image_loaders = vec![LoaderStep::with_options(
        "file-loader",
        json!({ "name": naming.asset_filename }),
    )];
    if mode.is_production() {
        // Uncompressed in development to keep rebuilds fast.
        image_loaders.push(LoaderStep::with_options(
            "image-webpack-loader",
            serde_json::to_value(ImageOptimization::default()).unwrap_or(Value::Null),
        ));
    }

    vec![
        script_rule(),
        AssetRule {
            kind: AssetKind::Style,
            test: STYLE_TEST.to_string(),
            exclude: None,
            loaders: vec![
                style_head,
                LoaderStep::with_options(
                    "css-loader",
                    json!({
                        "modules": { "localIdentName": local_ident },
                        "importLoaders": 1,
                        "sourceMap": dev,
                    }),
                ),
                LoaderStep::new("sass-loader"),
            ],
            emit: true,
        },
        AssetRule {
            kind: AssetKind::Font,
            test: FONT_TEST.to_string(),
            exclude: None,
            loaders: vec![LoaderStep::with_options(
                "file-loader",
                json!({ "name": naming.asset_filename }),
            )],
            emit: true,
        },
        AssetRule {
            kind: AssetKind::Image,
            test: IMAGE_TEST.to_string(),
            exclude: None,
            loaders: image_loaders,
            emit: true,
        },
    ]
}

/// Rules for the server-rendering bundle.
///
/// Styles only export class names and media is referenced, not re-emitted;
/// the browser bundle owns those files.
pub fn server_rules(naming: &OutputNaming) -> Vec<AssetRule> {
    vec![
        script_rule(),
        AssetRule {
            kind: AssetKind::Style,
            test: STYLE_TEST.to_string(),
            exclude: None,
            loaders: vec![
                LoaderStep::with_options(
                    "css-loader",
                    json!({ "modules": { "exportOnlyLocals": true } }),
                ),
                LoaderStep::new("sass-loader"),
            ],
            emit: false,
        },
        AssetRule {
            kind: AssetKind::Font,
            test: FONT_TEST.to_string(),
            exclude: None,
            loaders: vec![LoaderStep::with_options(
                "file-loader",
                json!({ "name": naming.asset_filename, "emitFile": false }),
            )],
            emit: false,
        },
        AssetRule {
            kind: AssetKind::Image,
            test: IMAGE_TEST.to_string(),
            exclude: None,
            loaders: vec![LoaderStep::with_options(
                "file-loader",
                json!({ "name": naming.asset_filename, "emitFile": false }),
            )],
            emit: false,
        },
    ]
}

fn script_rule() -> AssetRule {
    AssetRule {
        kind: AssetKind::Script,
        test: SCRIPT_TEST.to_string(),
        exclude: Some("node_modules".to_string()),
        loaders: vec![LoaderStep::with_options(
            "babel-loader",
            json!({ "cacheDirectory": true }),
        )],
        emit: true,
    }
}

/// Compiled form of a rule list; the first matching rule wins.
#[derive(Debug)]
pub struct RuleMatcher<'a> {
    compiled: Vec<(Regex, Option<Regex>, &'a AssetRule)>,
}

impl<'a> RuleMatcher<'a> {
    pub fn new(rules: &'a [AssetRule]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let test = Regex::new(&rule.test)?;
            let exclude = rule.exclude.as_deref().map(Regex::new).transpose()?;
            compiled.push((test, exclude, rule));
        }
        Ok(Self { compiled })
    }

    pub fn classify(&self, path: &Path) -> Option<&'a AssetRule> {
        let normalized = path.to_string_lossy().replace('\\', "/");
        self.compiled
            .iter()
            .find(|(test, exclude, _)| {
                test.is_match(&normalized)
                    && !exclude.as_ref().is_some_and(|ex| ex.is_match(&normalized))
            })
            .map(|(_, _, rule)| *rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(rules: &[AssetRule]) -> Vec<AssetKind> {
        rules.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn rule_order_is_fixed() {
        let naming = OutputNaming::for_mode(BuildMode::Production);
        let expected = vec![
            AssetKind::Script,
            AssetKind::Style,
            AssetKind::Font,
            AssetKind::Image,
        ];
        assert_eq!(kinds(&client_rules(BuildMode::Production, &naming)), expected);
        assert_eq!(kinds(&server_rules(&OutputNaming::server())), expected);
    }

    #[test]
    fn production_images_are_compressed() {
        let naming = OutputNaming::for_mode(BuildMode::Production);
        let rules = client_rules(BuildMode::Production, &naming);
        let image = &rules[3];
        let optimizer = image.loader("image-webpack-loader").unwrap();

        assert_eq!(optimizer.options["mozjpeg"]["quality"], 95);
        assert_eq!(optimizer.options["mozjpeg"]["progressive"], true);
        assert_eq!(optimizer.options["pngquant"]["quality"], json!([0.9, 1.0]));
        assert_eq!(optimizer.options["pngquant"]["speed"], 4);
        assert_eq!(optimizer.options["gifsicle"]["interlaced"], true);
        assert_eq!(optimizer.options["gifsicle"]["optimizationLevel"], 2);
    }

    #[test]
    fn development_images_skip_compression() {
        let naming = OutputNaming::for_mode(BuildMode::Development);
        let rules = client_rules(BuildMode::Development, &naming);
        assert!(!rules[3].has_loader("image-webpack-loader"));
    }

    #[test]
    fn style_head_depends_on_mode() {
        let dev = client_rules(
            BuildMode::Development,
            &OutputNaming::for_mode(BuildMode::Development),
        );
        let prod = client_rules(
            BuildMode::Production,
            &OutputNaming::for_mode(BuildMode::Production),
        );
        assert_eq!(dev[1].loaders[0].loader, "style-loader");
        assert_eq!(prod[1].loaders[0].loader, "extract-css-loader");
    }

    #[test]
    fn matcher_classifies_paths() {
        let naming = OutputNaming::for_mode(BuildMode::Production);
        let rules = client_rules(BuildMode::Production, &naming);
        let matcher = RuleMatcher::new(&rules).unwrap();

        let kind = |p: &str| matcher.classify(Path::new(p)).map(|r| r.kind);
        assert_eq!(kind("src/App.jsx"), Some(AssetKind::Script));
        assert_eq!(kind("src/theme.scss"), Some(AssetKind::Style));
        assert_eq!(kind("fonts/inter.woff2"), Some(AssetKind::Font));
        assert_eq!(kind("img/logo.jpeg"), Some(AssetKind::Image));
        assert_eq!(kind("README.md"), None);
        // Dependencies are excluded from transpilation.
        assert_eq!(kind("node_modules/react/index.js"), None);
    }

    #[test]
    fn server_rules_do_not_emit_media() {
        let rules = server_rules(&OutputNaming::server());
        assert!(rules[0].emit);
        assert!(rules[1..].iter().all(|r| !r.emit));
    }
}
