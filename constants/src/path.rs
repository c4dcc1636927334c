/// Directory, relative to the asset root, holding one `<scene>.json` card manifest per scene.
pub const RELATIVE_MANIFEST_PATH: &str = "cards";

/// Scene loaded at startup.
pub const DEFAULT_SCENE: &str = "business_card";

/// Extension registered with the JSON asset loader for card manifests.
pub const MANIFEST_EXTENSION: &str = "card.json";
