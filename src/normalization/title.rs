//! Title normalizer: reduces a raw marketplace title line to its canonical
//! form through an alias table and a strictly ordered rewrite cascade.
//!
//! The cascade grew rule by rule against real channel exports; order is
//! load-bearing. Rules are held as immutable data so subsets can be
//! injected in tests.

use anyhow::Result;
use regex::Regex;

use super::skip::SkipFilter;

/// Alias table: first matching pattern replaces the *entire* title and stops
/// the alias scan. Patterns are case-insensitive and unanchored.
///
/// These exist because many titles have irregular abbreviations or word
/// order that no generic suffix rule can fix.
const ALIAS_TABLE: &[(&str, &str)] = &[
    (r"ACE\s*COMBAT\s*7\s*SKIES\s*UNKNOWN", "ACE COMBAT 7 SKIES UNKNOWN"),
    (r"ARK\s*Survival\s*Evolved(?:\s*Explorer's)?", "ARK Survival Evolved"),
    (
        r"Assassin's\s*Creed\s*Chronicles(?:\s*[-–]\s*Trilogy)?",
        "Assassin's Creed Chronicles",
    ),
    (
        r"Assassin’s\s*CreedIV\s*Black\s*Flag",
        "Assassin's Creed IV Black Flag",
    ),
    (
        r"Assassin's\s*Creed\s*(?:IV|4)\s*Black\s*Flag",
        "Assassin's Creed IV Black Flag",
    ),
    (
        r"Batman(?:\s*[:\s])?\s*Arkham\s*Knight(?:\s*\d*)?",
        "Batman Arkham Knight",
    ),
    (r"Batman(?:\s*[:\s])?\s*Arkham\s*VR", "Batman Arkham VR"),
    (
        r"Batman(?:\s*[:\s])?\s*Return\s*to\s*Arkham(?:\s*Arkham\s*(?:Asylum|City))?",
        "Batman Return to Arkham",
    ),
    (r"Battlefield\s*(?:4|IV)(?:\s*full\s*game)?", "Battlefield 4"),
    (r"Battlefield\s*V", "Battlefield V"),
    (r"Beyond(?:\s*[:\s])?\s*Two\s*Souls", "Beyond Two Souls"),
    (
        r"Bloodborne(?:\s*(?:Game of the Year|The Old Hunters))?",
        "Bloodborne",
    ),
    (
        r"Call\s*of\s*Duty(?:\s*[:\s])?\s*Black\s*Ops\s*(?:III|3)(?:\s*Zombies\s*Chronicles)?",
        "Call of Duty Black Ops III",
    ),
    (
        r"Crash\s*Bandicoot\s*4(?:\s*[:\s])?\s*It's\s*About\s*Time",
        "Crash Bandicoot 4",
    ),
    (
        r"Crash\s*Team\s*Racing\s*Nitro-Fueled(?:\s*Nitros\s*Oxide)?",
        "Crash Team Racing Nitro-Fueled",
    ),
    (r"Crysis\s*(?:2|3|II|III)?(?:\s*Remastered)?", "Crysis"),
    (r"Batman\s*ARKHAM", "Batman Arkham"),
    (r"DAYS\s*GONE", "Days Gone"),
    (r"DIRT\s*5", "DIRT5"),
    (r"Dragon\s*Ball\s*XENOVERSE", "Dragon Ball Xenoverse"),
    (r"ELDEN\s*RING", "Elden Ring"),
    (r"LEGO\s*CITY\s*UNDERCOVER", "LEGO CITY Undercover"),
    (r"FIFA\s*21\s*Champions", "FIFA 21"),
    (r"FOR\s*HONOR", "For Honor"),
    (r"Ghost\s*of\s*Tsushima\s*Legends", "Ghost of Tsushima"),
    (r"Goat\s*Simulator\s*GOATY", "Goat Simulator"),
    (r"eFootball\s*PES\s*2021\s*SEASON\s*UPDATE", "PES 2021"),
    (r"EA\s*SPORTS\s*FIFA\s*17", "FIFA 17"),
    (r"EA\s*SPORTS\s*FIFA\s*23", "FIFA 23"),
    (r"EA\s*SPORTS\s*FIFA\s*20", "FIFA 20"),
    (r"EA\s*SPORTS\s*FIFA\s*16", "FIFA 16"),
    (
        r"Call\s*of\s*Duty\s*Modern\s*Warfare\s*(?:III|3)",
        "Call of Duty Modern Warfare III",
    ),
    (
        r"Call\s*of\s*Duty\s*Modern\s*Warfare\s*(?:II|2)",
        "Call of Duty Modern Warfare II",
    ),
    (
        r"Call\s*of\s*Duty\s*Modern\s*Warfare",
        "Call of Duty Modern Warfare",
    ),
    (
        r"Assassin’s\s*Creed\s*Odyssey\s*GOLD",
        "Assassin's Creed Odyssey",
    ),
    (
        r"Assassin’s\s*Creed\s*Mirage\s*Master\s*Assassin",
        "Assassin's Creed Mirage",
    ),
    (r"Call\s*of\s*Duty\s*Vanguard-bundel", "Call of Duty Vanguard"),
    (
        r"Crash\s*Bandicoot\s*4\s*It’s\s*About\s*Time",
        "Crash Bandicoot 4",
    ),
    (r"DARK\s*SOULS\s*Ⅲ\s*FIRE\s*FADES", "DARK SOULS III"),
    (
        r"Demon\s*Slayer\s*-Kimetsu\s*no\s*Yaiba\s*Hinokami\s*Chronicles",
        "Demon Slayer Kimetsu no Yaiba",
    ),
    (r"Devil\s*May\s*Cry\s*5\s*\+\s*Vergil", "Devil May Cry 5"),
    (r"DiRT\s*Rally\s*2.0\s*Germany", "DiRT Rally 2.0"),
    (r"EA\s*SPORTS\s*FC\s*24\s*and", "EA Sports FC 24"),
    (r"EA\s*SPORTS\s*FIFA\s*18\s*&\s*NBA\s*LIVE\s*18", "FIFA 18"),
    (
        r"eFootball\s*Pro\s*Evolution\s*Soccer\s*2020",
        "eFootball PES 2020",
    ),
    (
        r"Exps\s*A\s*MudRunner\s*Game\s*Year\s*1",
        "Exps A MudRunner Game",
    ),
    (r"Fallout\s*4(?:\s*G\.O\.T\.Y\.)?", "Fallout 4"),
    (r"Far\s*Cry\s*3", "Far Cry 3"),
    (r"FAR\s*CRY\s*6\s*–?", "FAR CRY 6"),
    (r"Hogwarts(?:\s*Version)?", "Hogwarts"),
    (
        r"KINGDOM\s*HEARTS\s*III|KINGDOM\s*HEARTS\s*Ⅲ",
        "KINGDOM HEARTS III",
    ),
    (r"God\s*of\s*War\s*III", "God of War III Remastered"),
    (r"GOD\s*OF\s*WARIII", "God of War III Remastered"),
    (r"The\s*Last\s*of\s*Us\s*Parte\s*II", "The Last of Us Part II"),
    (r"The\s*Last\s*of\s*Us\s*Parte\s*I", "The Last of Us Part I"),
    (r"LEGO\s*DC\s*Super-Vilões", "LEGO DC Super-Villains"),
    (r"LEGO\s*MARVEL's\s*Avengers", "LEGO Marvel"),
    (r"LEGO\s*Marvel’s\s*Avengers", "LEGO Marvel"),
    (r"LEGO\s*NINJAGO\s*Movie\s*Video\s*Game", "LEGO NINJAGO Movie"),
    (
        r"Metal\s*Gear\s*Solid\s*V\s*Experience",
        "METAL GEAR SOLID V DEFINITIVE EXPERIENCE",
    ),
    (
        r"Mortal\s*Kombat\s*11(?:\s*\+\s*(?:Add-On|Aftermath|Kombat-2|Injustice\s*2\s*Leg\.))?",
        "Mortal Kombat 11",
    ),
    (r"NieR\s*Automata\s*Game\s*of\s*the\s*YoRHa", "NieR Automata"),
    (r"Prototype2", "Prototype 2"),
    (r"SnowRunner\s*1-Year", "SnowRunner"),
    (r"SOULCALIBUR\s*Ⅵ", "SOULCALIBUR VI"),
    (
        r"SpongeBob\s*SquarePants\s*Battle\s*For\s*Bikini\s*Bottom\s*Rehydrated",
        "SpongeBob SquarePants",
    ),
    (
        r"SpongeBob\s*SquarePants\s*Battle\s*For\s*Bikini\s*Bottom",
        "SpongeBob SquarePants",
    ),
    (r"STEEP\s*GOLD", "STEEP"),
    (r"TOM\s*CLANCY'S\s*DIVISION", "Tom Clancy's Division"),
    (
        r"Tom\s*Clancy's\s*Rainbow\s*Six(?:\s*Siege)?",
        "Tom Clancy's Rainbow Six",
    ),
    (
        r"Uncharted\s*4\s*A\s*Thief['’]s\s*End",
        "Uncharted 4 A Thief's End",
    ),
    (r"Watch\s*Dogs\s*2", "Watch Dogs 2"),
    (r"WATCH_DOGS", "Watch Dogs"),
    (
        r"WWE\s*2K24(?:\s*40th\s*Anniversary\s*of\s*WrestleMania)?",
        "WWE 2K24",
    ),
    (r"EA\s*SPORTS\s*FC\s*25(?:\s*and.*)?", "EA SPORTS FC 25"),
    (
        r"Assassin’s\s*Creed\s*Chronicles\s*China",
        "Assassin's Creed Chronicles",
    ),
    (
        r"Assassin’s\s*Creed\s*Chronicles\s*India",
        "Assassin's Creed Chronicles",
    ),
    (
        r"Battlefield\s*1\s*&\s*Titanfall\s*2",
        "Battlefield 1 e Titanfall 2",
    ),
    (r"Mass\s*Effect\s*Andromeda", "Mass Effect"),
    (r"Mortal\s*Kombat\s*X\s*\+?\s*XL", "Mortal Kombat X"),
    (r"TEKKEN7", "TEKKEN 7"),
    (
        r"Tom\s*Clancy’s\s*Rainbow\s*Six\s*Extraction",
        "Tom Clancy's Rainbow Six",
    ),
    (
        r"Tom\s*Clancy’s\s*Rainbow\s*Six\s*Siege",
        "Tom Clancy's Rainbow Six",
    ),
    (
        r"Uncharted\s*The\s*Nathan\s*Drake's",
        "Uncharted The Nathan Drake",
    ),
    (r"Call\s*of\s*Duty\s*WWIIچ", "Call of Duty WWII"),
    (
        r"Grand\s*Theft\s*Auto\s*San\s*Andreas\s*–\s*The",
        "Grand Theft Auto: San Andreas",
    ),
    (r"Grand\s*Theft\s*Auto\s*III\s*–\s*The", "Grand Theft Auto III"),
    (r"Grand\s*Theft\s*Auto\s*The", "Grand Theft Auto"),
    (
        r"Grand\s*Theft\s*Auto\s*Vice\s*City\s*–\s*The",
        "Grand Theft Auto Vice City",
    ),
    (r"Grand\s*Theft\s*Auto\s*3", "Grand Theft Auto III"),
    (r"Nioh\s*The", "Nioh"),
    (
        r"Rise\s*of\s*the\s*Tomb\s*Raider",
        "Rise of the Tomb Raider: 20 Year Celebration",
    ),
    (r"Ratchet\s*&\s*Clank\s*3", "Ratchet & Clank"),
    (r"Alien\s*&\s*Isolation\s*THE", "Alien Isolation"),
];

/// Ordered rewrite cascade. Each rule is applied to every occurrence before
/// the next rule runs; anchored rules fire at most once. Replacements use
/// `${n}` for captured groups.
const REWRITE_CASCADE: &[(&str, &str)] = &[
    // marketing suffixes seen verbatim in channel exports
    (r"\s*GOLD EDITION", ""),
    (r"\s*Royal Edition", ""),
    (r"\s*NBA 75th Anniversary Edition", ""),
    (r"\s*Deluxe Recruit Edition", ""),
    (r"\s*Standard Recruit Edition", ""),
    (r"\s*Galactic Edition", ""),
    (r"\s*STORM 4 ROAD TO BORUTO", ""),
    (r"\s*Championship Edition", ""),
    (r"\s*Survival Evolved", ""),
    (r"\s*Ultimate Survivor Edition", ""),
    (r"\s*Survival Ascended", ""),
    (r"\s*Rescue Mission", ""),
    (r"\s*Traveler Edition", ""),
    (r"\s*GOLD Edition", ""),
    (r"\s*The Old Hunters Edition", ""),
    (r"\s*Zombies Chronicles Edition", ""),
    (r"\s*Triple Pack PS4 & PS5", ""),
    (r"\s*Curator's Cut", ""),
    (r"\s*Switchback VR", ""),
    (r"\s*Blades & Whip Edition", ""),
    (r"\s*Warmastered Edition", ""),
    (r"\s*The Fire Fades Edition", ""),
    (r"\s*REMASTERED", ""),
    (r"\s*SEASON UPDATE", ""),
    (r"\s*HD Collection", ""),
    (r"\s*Eternal Collection", ""),
    (r"\s*Reaper of Souls - Ultimate Evil Edition", ""),
    (r"\s*Resurrected", ""),
    (r"\s*- Germany (Rally Location)", ""),
    (r"\s*The Final Cut", ""),
    (r"\s*Death of the Outsider", ""),
    (r"\s*Definitive Edtion", ""),
    (r"\s*Hamlet Console Edition", ""),
    (r"\s*VR Edition", ""),
    (r"\s*Super Deluxe Edition", ""),
    (r"\s*Shadow of the Erdtree", ""),
    (r"\s*Tamriel Unlimited", ""),
    (r"\s*Skyrim Special Edition", ""),
    (r"\s*Skyrim Anniversary Edition", ""),
    (r"\s*Skyrim VR", ""),
    (r"\s*Anniversary Edition", ""),
    (r"\s*Deluxe Schumacher Edition", ""),
    (r"\s*Seventy Edition", ""),
    (r"\s*Champions PS4 et PS5 Edition", ""),
    (r"\s*Blood Dragon", ""),
    (r"\s*Classic Edition", ""),
    (r"\+\s*FAR CRY PRIMAL", ""),
    (r"\s*Standard Edition PS4 & PS5", ""),
    (r"\s*standard PS4 & PS5", ""),
    (r"\s*New Dawn Deluxe Edition", ""),
    (r"\s*Digital Apex Edition", ""),
    (r"\s*APEX EDITION", ""),
    (r"\s*Platinum Edition PS4 & PS5", ""),
    (r"\s*ICON Edition", ""),
    (r"\s*NHL™ 19 Bundle", ""),
    (r"\s*NHL 19 Bundle", ""),
    (r"\s*The One Edition Bundle", ""),
    (r"\s*Ultimate Edition for", ""),
    (r"\s*REMAKE & REBIRTH Digital Deluxe Twin Pack", ""),
    (r"\s*REBIRTH", ""),
    (r"\s*Digital Exclusive Bundle", ""),
    (r"\s*Digital Edition deluxe", ""),
    (r"\s*25th Anniversary Digital Deluxe Edition", ""),
    (r"\s*Version: PS4", ""),
    (r"\s*Quidditch Champions PS4 & PS5", ""),
    (r"\s*Quidditch Champions", ""),
    (r"\s*Super Citizen Edition", ""),
    (r"\s*Dive Harder [R3]", ""),
    (r"\s*Super-Earth Ultimate Edition", ""),
    (r"\s*Absolution HD", ""),
    (r"\s*Blood Money HD", ""),
    (r"\s*The Heir of Hogwarts", ""),
    (r"\s*Voidheart Edition", ""),
    (r"\s*Wrong Number PS4 & PS5", ""),
    (r"\s*Showdown", ""),
    (r"\s*Scrat's Crazy Adventure", ""),
    (r"\s*Scrat's Nutty Adventure", ""),
    (r"\s*& SGW3 Unlimited Edition", ""),
    (r"\s*ULTIMATE EDITION", ""),
    (r"\s*Deluxe Party Edition", ""),
    (r"\s*Platinum Edition", ""),
    (r"\s*Croft Edition", ""),
    (r"\s*& Gat out of Hell", ""),
    (r"\s*20e anniversaire", ""),
    (r"\s*20 Year Celebration", ""),
    (r"\s*Gold Edition & Village Gold Edition", ""),
    (r"\s*Champions PS4", ""),
    (r"\s*A Realm Reborn", ""),
    (r"\s*Online - Complete Collector’s Edition", ""),
    (r"\s*MULTIPLAYER: COMRADES", ""),
    (r"\s*biohazard", ""),
    (r"\s*Edition Ultime", ""),
    (r"\s*Rift Apart PS5", ""),
    (r"\s*STANDARD EDITION", ""),
    (r"\s*ROYAL EDITION", ""),
    (r"\s*Persona Bundle", ""),
    (r"\s*Gourmet Edition", ""),
    (r"\s*Month 1 Edition", ""),
    (r"\s*X-Factor Edition till", ""),
    (r"\s*for PS5", ""),
    (r"\s*Palace Edition", ""),
    (r"\s*Pursuit Remastered", ""),
    (r"\s*Mamba Forever Edition Bundle", ""),
    (r"\s*for PS4", ""),
    (r"\s*Michael Jordan Edition", ""),
    (r"\s*Baller Edition", ""),
    (r"\s*Black Mamba Edition", ""),
    (r"\s*Kobe Bryant Edition", ""),
    (r"\s*Road to Boruto", ""),
    (r"\s*Iceborne Master Edition", ""),
    (r"\s*Iceborne", ""),
    (r"\s*Digital Deluxe Edition ---> PS5", ""),
    (r"\+\s*Sunbreak", ""),
    (r"\s*The Official Videogame", ""),
    (r"\s*Legion Edition", ""),
    (r"\s*Exclusive Digital Edition", ""),
    (r"\s*Superstar Edition", ""),
    (r"\s*75th Anniversary Edition", ""),
    (r"\s*Kobe Bryant", ""),
    (r"\s*‎: Legion of Dawn Edition", ""),
    (r"\s*All-Star Edition", ""),
    (r"\s*Edizione Standard", ""),
    (r"\s*Originals Edition", ""),
    (r"\s*Legends Edition", ""),
    (r"\s*Master Hunter Bundle", ""),
    (r"\s*Standard Edition", ""),
    (r"\s*Operator Edition", ""),
    (r"\s*Aftermath >>> PS5", ""),
    (r"\s*Icon Edition", ""),
    (r"\s*The Successor of the Legend", ""),
    (r"\s*Dream Maker", ""),
    (r"\s*Year 2 Gold Edition", ""),
    (r"\s*COMPLETE EDITION", ""),
    (r"\s*Ancient Air Snail Bundle", ""),
    (r"\s*Chapter 2: Retribution - Payback Edition", ""),
    (r"\s*Pro Tour Deluxe Edition", ""),
    (r"\s*Help Wanted - Bundle", ""),
    (r"\s*Sister Location", ""),
    (r"\s*Marching Fire Edition", ""),
    (r"\s*DIRECTOR'S CUT", ""),
    (r"\s*Deluxe Download Edition", ""),
    (r"\s*Legends PS4 Edition", ""),
    (r"\s*Security Breach PS4 & PS5", ""),
    (r"\s*Online Complete Edition", ""),
    (r"\s*Riptide Definitive Edition", ""),
    (r"^(.*?)\s*: Nitros Oxide Edition$", "${1}"),
    (r"^(.*?)\s*: Nitros Oxide$", "${1}"),
    // franchise spelling standardization
    (r"(?i)FIFA\s*(\d{2})", "FIFA ${1}"),
    (r"(?i)Battlefield\s*", "Battlefield "),
    (r"(?i)BATMAN", "Batman"),
    (r"(?i)ACE\s*COMBAT\s*7", "ACE COMBAT 7"),
    (r"(?i)Assassin['’]s\s*Creed", "Assassin's Creed"),
    (r"(?i)DRAGON\s*BALL", "Dragon Ball"),
    // generic marketing words (require trailing break)
    (
        r"(?i)\s*(Bundle|Pack|Vault|Cross-?gen|Launch|Full game|Enhanced|Special|Final Battle|Competition|Competizione|Competizioneerous|Revolution|Multi-Gen|Multi-Generation)(?:\s|$)",
        "",
    ),
    (r"(?i)\s*(?:Game of the Year|Director's Cut)(?:\s+Edition)?", ""),
    // decorative bracket / parenthetical content
    (r"\s*\[.*?\]", ""),
    (r"\s*\(.*?\)", ""),
    (r"\s*\[\d+\]$", ""),
    // bilingual "for PS4 and PS5" tails
    (r"^(.*?)\s+per\s+PS\d+\s+e\s+PS\d+$", "${1}"),
    (r"^(.*?)\s+for\s+PS\d+\s+and\s+PS\d+$", "${1}"),
    (r"^(.*?)\s+–\s+PS\d+\s+and\s+PS\d+$", "${1}"),
    (r"^(.*?)\s+—\s+PS\d+\s+PS\d+$", "${1}"),
    (r"^(.*?)\s+–\s+PS\d+\s+og\s+PS\d+$", "${1}"),
    (r"^(.*?)\s+–\s+PS\d+\s+PS\d+$", "${1}"),
    (r"^(.*?)\s+pour\s+PS\d+\s+et\s+PS\d+$", "${1}"),
    (r"\bOf\b", "of"),
    (r"\s*Cross-Gen-Bundle\s*", " "),
    (r"\s*Multi-Generation Lite\s*", " "),
    // fold "Title: Subtitle" into "Title Subtitle"
    (r"^(.*?):\s*(.*)$", "${1} ${2}"),
    (r"^(.*?)\s*: Competition$", "${1}"),
    (r"^(.*?)\s*: Competizione$", "${1}"),
    (r"^(.*?)\s*: \+ CTR Nitro-Fueled$", "${1}"),
    (r"\s*Nitros Oxide", ""),
    (r"^(.*?)\s*: Traveler Edition$", "${1}"),
    (r"^(.*?)\s*: e Titanfall 2$", "${1}"),
    (r"^(.*?)\s*: ==Revolution$", "${1}"),
    // en-dash trailing qualifiers
    (r"^(.*?)\s*–\s*The\s+Definitive$", "${1}"),
    (r"^(.*?)\s*–\s*Legend\s+Edition$", "${1}"),
    (r"^(.*?)\s*–\s*Deluxe\s+Party\s+Edition$", "${1}"),
    (r"^(.*?)\s*–\s*Standard\s+Eition$", "${1}"),
    (r"^(.*?)\s*–\s*Standard\s+Edition$", "${1}"),
    (r"^(.*?)\s*–\s*Traveler\s+Edition$", "${1}"),
    (r"^(.*?)\s*–\s*Enhanced\s+Edition$", "${1}"),
    (r"^(.*?)\s*–\s*Console\s+Edition$", "${1}"),
    (r"^(.*?)\s*–\s*DIRECTOR’S\s+CUT$", "${1}"),
    (r"^(.*?)\s*–\s*Ultimate\s+Bundle$", "${1}"),
    (r"^(.*?)\s*–\s*Edition\s+Bundle$", "${1}"),
    (r"^(.*?)\s*–\s*Seventy\s+Edition$", "${1}"),
    (r"^(.*?)\s*–\s*Deluxe\s+Launch\s+Edition$", "${1}"),
    (r"^(.*?)\s*–\s*Game\s+of\s+the\s+Year$", "${1}"),
    (r"^(.*?)\s*–\s*Game\s+of\s+the\s+Year\s+Edition$", "${1}"),
    (r"^(.*?)\s*–\s*MVP\s+Edition$", "${1}"),
    (r"\|", ""),
    (r"\s+Stand Alone$", ""),
    (r"\s+--->$", ""),
    (r"\s*\(Standalone\)$", ""),
    // loose marketing words (single pass each, global)
    (r"\s*Remake\s*", " "),
    (r"\s*\[15559\]\s*", " "),
    (r"\s*Console\s*", " "),
    (r"\s*PlayStation4\s*", " "),
    (r"\s*Remasterizado\s*", " "),
    (r"\s*Reloaded\s*", " "),
    (r"\s*Digital\s*", " "),
    (r"\s*Ultimate\s*", " "),
    (r"\s*Legend Edition\s*", " "),
    (r"\s*premium Edition\s*", " "),
    (r"\s*Edition premium\s*", " "),
    (r"\s*Campagne Remaster\s*", " "),
    (r"\s*Campaign Remastered\s*", " "),
    (r"\s*Estndar Edicin\s*", " "),
    (r"\s*Standardowa\s*", " "),
    (r"\bChampions Edition\b", " "),
    (r"@fullhacker2017\b", " "),
    (r"\bTOP GUN: Maverick\b", " "),
    (r"\s*350 T\s*", " "),
    (r"\bVR MODE\b", " "),
    (r"\bPS4 & PS5\b", " "),
    (r"\bper\b", " "),
    (r"\bElite\b", " "),
    (r">>> PS5\b", " "),
    (r"\bTHE COLLECTION\b", " "),
    (r"\bCOLLECTION\b", " "),
    (r"\s*Definitive\s*", " "),
    (r"\s*Premium\s*", " "),
    (r"\s*Deluxe\s*", " "),
    (r"\s*Standart\s*", " "),
    (r"\s*Standard pour\s*", " "),
    (r"\s*Explorer's Edition\s*", " "),
    (r"\s*Eition\s*", " "),
    (r"\s*Edycja\s*", " "),
    (r"\s*Sürüm\s*", " "),
    (r"\s*Edicimn\s*", " "),
    (r"\s*Estandar\s*", " "),
    (r"\s*Standard\s*", " "),
    (r"\s*para\s*", " "),
    (r"\s*Gold\s*", " "),
    (r"\s*Legendary\s*", " "),
    (r"\s*Complete\s*", " "),
    (r"^(.*?)\s*–\s*The Definitive Edition$", "${1}"),
    (r"^(.*?)\s*–\s*The Definitive$", "${1}"),
    (r"(?i)\s+-\s+(?:Trilogy|Collection)$", ""),
    (r"(?i)\s+(?:Legacy|Next Level)$", ""),
    // trademark glyphs and region tags
    (r"[™®]", ""),
    (r"\s*\[R[1-3]\]", ""),
    (r"\s*\\\[R[1-3]\\\]", ""),
    // platform qualifiers
    (r"^(.*?)\s*\(PS\d+™?[^)]*\)$", "${1}"),
    (r"^(.*?)(\s+PS\d+.*)?$", "${1}"),
    (r"(?i)\s*>>>\s*PS[45]", ""),
    (r"\s*\\>\\>\\>", ""),
    (r"\s*\\>\\>", ""),
    (r"\s*>>", ""),
    (r"(?i)\s*PS4‎?\s*(?:[&ey]|et|og)\s*PS5™?", ""),
    (r"\s*PS[45]™?\b", ""),
    (r"^(.*?)\s*:\s*Premium Edition$", "${1}"),
    (r"^(.*?)(\s*–\s*The Definitive Edition\s*>>>.*)?$", "${1}"),
    (r"^(.*?)\s*:\s*Edition\s+Premium$", "${1}"),
    (r"(?i):\s*Game of the Year(?:\s+Edition)?", ""),
    (
        r"(?i)\s*(?:Digital\s+)?(?:Deluxe\s+)?Edition(?:\s+PS[45])?",
        "",
    ),
    (r"(?i)\s*Version\s*PS[45]", ""),
    (r"(?i)\s*for PS4™?", ""),
    (r"®:\s*", ": "),
    (r"LEGO®", "LEGO"),
    (r"^\\", ""),
    (r"\s*vs\.\s*", " vs "),
    (r"\\", ""),
    (r"^(.*?)\s+Version:", "${1}"),
    (r"^(.*?)\s*\(PlayStation\d+\)$", "${1}"),
    (r"\s+", " "),
    (r"\s*-Lite\s*", " "),
    (r"\s*PlayStation5\s*", " "),
];

/// Edition words swept after the cascade, each as `\s*[-–]?\s*<word>`.
const EDITION_WORDS: &[&str] = &[
    "Cross-Gen",
    "Standard Edition",
    "Gold Edition",
    "Legendary Edition",
    "Complete Edition",
    "Game of the Year Edition",
    "Digital Deluxe Edition",
    "Deluxe Party Edition",
    "Deluxe Edition",
    "PS4 Edition",
    "Bundle",
    "Pack",
    "Vault",
    "Cross-gen",
    "Crossgen",
    "Launch",
    "Full game",
    "Enhanced",
    "Special",
    "Legacy",
    "Next Level",
    "Director's Cut",
    "The Collection",
    "THE COLLECTION",
    "The Complete Edition",
    "Trilogy",
];

struct AliasRule {
    pattern: Regex,
    canonical: String,
}

struct RewriteRule {
    pattern: Regex,
    replacement: String,
}

/// Ordered rewrite pipeline producing canonical titles.
///
/// Pipeline: skip guard -> alias lookup -> cascade fold -> editions sweep ->
/// hyphen cleanup -> second alias lookup. The second lookup is deliberate:
/// stripping can reveal an alias match that a suffix masked.
pub struct TitleNormalizer {
    skip: SkipFilter,
    aliases: Vec<AliasRule>,
    cascade: Vec<RewriteRule>,
    editions: Vec<Regex>,
    leading_hyphen: Regex,
    interior_hyphen: Regex,
    trailing_hyphen: Regex,
    ctr_tails: Vec<Regex>,
}

impl TitleNormalizer {
    /// Build the normalizer with the full default rule tables.
    pub fn with_defaults() -> Result<Self> {
        Self::from_rules(
            SkipFilter::with_defaults()?,
            ALIAS_TABLE,
            REWRITE_CASCADE,
            EDITION_WORDS,
        )
    }

    /// Build from explicit rule subsets (used by tests).
    pub fn from_rules(
        skip: SkipFilter,
        aliases: &[(&str, &str)],
        cascade: &[(&str, &str)],
        editions: &[&str],
    ) -> Result<Self> {
        let aliases = aliases
            .iter()
            .map(|(p, canonical)| {
                Ok(AliasRule {
                    pattern: Regex::new(&format!("(?i){p}"))?,
                    canonical: (*canonical).to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let cascade = cascade
            .iter()
            .map(|(p, replacement)| {
                Ok(RewriteRule {
                    pattern: Regex::new(p)?,
                    replacement: (*replacement).to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let editions = editions
            .iter()
            .map(|word| Ok(Regex::new(&format!(r"\s*[-–]?\s*{word}"))?))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            skip,
            aliases,
            cascade,
            editions,
            leading_hyphen: Regex::new(r"^\\?-\s+")?,
            interior_hyphen: Regex::new(r"\s+\\?-\s+")?,
            trailing_hyphen: Regex::new(r"\s*\\?[-–—]\s*$")?,
            ctr_tails: vec![
                Regex::new(r"\s*\+\s*CTR Nitro-Fueled")?,
                Regex::new(r"\s*\+\s*Nitros Oxide")?,
            ],
        })
    }

    /// The line classifier backing this normalizer.
    pub fn skip_filter(&self) -> &SkipFilter {
        &self.skip
    }

    /// Produce the canonical title, or `None` when the line is noise.
    ///
    /// Very short outputs are *not* rejected here; the length gate belongs
    /// to the matcher boundary.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        if self.skip.should_skip(raw) {
            return None;
        }

        let mut title = collapse_ws(raw);
        title = self.apply_aliases(title);

        for rule in &self.cascade {
            title = rule
                .pattern
                .replace_all(&title, rule.replacement.as_str())
                .into_owned();
        }

        for pattern in &self.editions {
            title = pattern.replace_all(&title, "").into_owned();
        }

        title = self.leading_hyphen.replace(&title, "").into_owned();
        title = self.interior_hyphen.replace_all(&title, " ").into_owned();
        title = self.trailing_hyphen.replace(&title, "").into_owned();
        for pattern in &self.ctr_tails {
            title = pattern.replace_all(&title, "").into_owned();
        }

        title = collapse_ws(&title);
        title = self.apply_aliases(title);

        Some(title)
    }

    fn apply_aliases(&self, title: String) -> String {
        for rule in &self.aliases {
            if rule.pattern.is_match(&title) {
                return rule.canonical.clone();
            }
        }
        title
    }
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> TitleNormalizer {
        TitleNormalizer::with_defaults().unwrap()
    }

    #[test]
    fn noise_lines_normalize_to_none() {
        let n = normalizer();
        assert_eq!(n.normalize("💰Price PS4: 100"), None);
        assert_eq!(n.normalize("================="), None);
        assert_eq!(n.normalize("PS4 Buy Account"), None);
    }

    #[test]
    fn alias_replaces_whole_title() {
        let n = normalizer();
        assert_eq!(n.normalize("DAYS GONE").as_deref(), Some("Days Gone"));
        assert_eq!(n.normalize("FIFA 21 Champions").as_deref(), Some("FIFA 21"));
        assert_eq!(
            n.normalize("eFootball PES 2021 SEASON UPDATE").as_deref(),
            Some("PES 2021")
        );
    }

    #[test]
    fn alias_is_case_insensitive_and_unanchored() {
        let n = normalizer();
        assert_eq!(n.normalize("days gone").as_deref(), Some("Days Gone"));
        assert_eq!(n.normalize("elden ring").as_deref(), Some("Elden Ring"));
    }

    #[test]
    fn strips_edition_suffixes() {
        let n = normalizer();
        assert_eq!(
            n.normalize("Horizon Zero Dawn Complete Edition").as_deref(),
            Some("Horizon Zero Dawn")
        );
        assert_eq!(
            n.normalize("The Witcher 3 – Game of the Year Edition")
                .as_deref(),
            Some("The Witcher 3")
        );
    }

    #[test]
    fn strips_platform_qualifiers_and_glyphs() {
        let n = normalizer();
        assert_eq!(
            n.normalize("Detroit Become Human™ PS4").as_deref(),
            Some("Detroit Become Human")
        );
        assert_eq!(
            n.normalize("Stray per PS4 e PS5").as_deref(),
            Some("Stray")
        );
        assert_eq!(
            n.normalize("It Takes Two pour PS4 et PS5").as_deref(),
            Some("It Takes Two")
        );
    }

    #[test]
    fn strips_bracket_and_parenthetical_content() {
        let n = normalizer();
        assert_eq!(
            n.normalize("Overcooked [R2] (Digital)").as_deref(),
            Some("Overcooked")
        );
    }

    #[test]
    fn second_alias_pass_fires_after_stripping() {
        // "Uncharted: The Nathan Drake's Collection PS4" only matches its
        // alias once the colon fold and platform strip have run.
        let n = normalizer();
        assert_eq!(
            n.normalize("Uncharted: The Nathan Drake's Collection PS4")
                .as_deref(),
            Some("Uncharted The Nathan Drake")
        );
    }

    #[test]
    fn may_return_very_short_titles() {
        // The < 3 char gate is the matcher's job, not the normalizer's.
        let n = normalizer();
        assert_eq!(n.normalize("It").as_deref(), Some("It"));
    }

    #[test]
    fn cascade_order_is_injectable() {
        let skip = SkipFilter::from_patterns(&[]).unwrap();
        let n = TitleNormalizer::from_rules(
            skip,
            &[],
            &[(r"b", "c"), (r"c", "d")],
            &[],
        )
        .unwrap();
        // Both rules run, in order: b -> c, then every c -> d.
        assert_eq!(n.normalize("abc").as_deref(), Some("add"));
    }

    #[test]
    fn editions_sweep_handles_dash_variants() {
        let n = normalizer();
        assert_eq!(
            n.normalize("Sniper Elite 4 – Deluxe Edition").as_deref(),
            Some("Sniper 4")
        );
    }
}
