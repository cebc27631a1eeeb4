// Fixed lists the catalog document doesn't carry

/// Traders in sidebar order
pub const TRADERS: &[&str] = &[
    "Prapor",
    "Therapist",
    "Fence",
    "Skier",
    "Peacekeeper",
    "Mechanic",
    "Ragman",
    "Jaeger",
    "Ref",
    "Lightkeeper",
    "BTR Driver",
];

/// Items the Collector quest asks for
pub const COLLECTOR_ITEMS: &[&str] = &[
    "Old firesteel",
    "Antique axe",
    "Battered antique book",
    "#FireKlean gun lube",
    "Golden rooster figurine",
    "Silver Badge",
    "Deadlyslob's beard oil",
    "Golden 1GPhone smartphone",
    "Jar of DevilDog mayo",
    "Can of sprats",
    "Fake mustache",
    "Kotton beanie",
    "Raven figurine",
    "Pestily plague mask",
    "Shroud half-mask",
    "Can of Dr. Lupo's coffee beans",
    "42 Signature Blend English Tea",
    "Veritas guitar pick",
    "Evasion armband",
    "Can of RatCola soda",
    "Loot Lord plushie",
    "Smoke balaclava",
    "WZ Wallet",
    "LVNDMARK's rat poison",
    "Missam forklift key",
    "Video cassette with the Cyborg Killer movie",
    "BakeEzy cook book",
    "JohnB Liquid DNB glasses",
    "Baddie's red beard",
    "DRD body armor",
    "Gingy keychain",
    "Golden egg",
    "Press pass (issued for NoiceGuy)",
    "Axel parrot figurine",
    "BEAR Buddy plush toy",
    "Glorious E lightweight armored mask",
    "Inseq gas pipe wrench",
    "Viibiin sneaker",
    "Tamatthi kunai knife replica",
    "Flat screwdriver (Long)",
    "Lupus antenna",
    "BTR figurine",
    "Antique teapot",
];

/// Storage key for completed quest ids
pub const PROGRESS_KEY: &str = "uqt_progress";

/// Storage key for found collector items
pub const STASH_KEY: &str = "uqt_stash";

/// Where the catalog document lives unless configured otherwise
pub const DEFAULT_CATALOG_SOURCE: &str = "./quests_updated.json";
