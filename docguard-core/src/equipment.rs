//! German-to-French equipment translation for dealer listings.
//!
//! Dealer descriptions list equipment as separated German terms
//! ("Klimaautomatik, Sitzheizung, Navi"). Each fragment is matched against a
//! table of term patterns and mapped to a French label and a category.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Confort,
    Securite,
    Multimedia,
    Conduite,
    Exterieur,
    Interieur,
}

impl Category {
    /// Serialized key, e.g. `securite`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confort => "confort",
            Self::Securite => "securite",
            Self::Multimedia => "multimedia",
            Self::Conduite => "conduite",
            Self::Exterieur => "exterieur",
            Self::Interieur => "interieur",
        }
    }

    /// French display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Confort => "Confort",
            Self::Securite => "Sécurité",
            Self::Multimedia => "Multimédia",
            Self::Conduite => "Aide à la conduite",
            Self::Exterieur => "Extérieur",
            Self::Interieur => "Intérieur",
        }
    }
}

use Category::*;

// Specific patterns precede the general ones they overlap with.
const TERMS: &[(&str, &str, Category)] = &[
    // Confort
    (r"(2|zwei|3|drei|4|vier)[\s-]*zonen[\s-]*klima", "Climatisation automatique multizone", Confort),
    (r"klimaautomatik", "Climatisation automatique", Confort),
    (r"klima(anlage)?\b", "Climatisation", Confort),
    (r"sitzheizung", "Sièges chauffants", Confort),
    (r"sitzbel(ü|ue)ftung", "Sièges ventilés", Confort),
    (r"massage", "Sièges massants", Confort),
    (r"lenkradheizung|beheizbares\s+lenkrad", "Volant chauffant", Confort),
    (r"standheizung", "Chauffage stationnaire", Confort),
    (r"elektr(\.|ische)?\s*sitz", "Sièges électriques", Confort),
    (r"panorama", "Toit panoramique", Confort),
    (r"schiebedach|glasdach", "Toit ouvrant", Confort),
    (r"keyless|schl(ü|ue)ssellos", "Accès et démarrage sans clé", Confort),
    (r"zentralverriegelung", "Verrouillage centralisé", Confort),
    (r"fensterheber", "Vitres électriques", Confort),
    // Aide à la conduite
    (r"abstandstempomat|adaptive[rs]?\s+tempomat|\bacc\b", "Régulateur de vitesse adaptatif", Conduite),
    (r"tempomat|geschwindigkeitsregelanlage", "Régulateur de vitesse", Conduite),
    (r"360", "Caméra 360°", Conduite),
    (r"r(ü|ue)ckfahrkamera", "Caméra de recul", Conduite),
    (r"parkassist|einparkassist", "Aide au stationnement automatique", Conduite),
    (r"einparkhilfe|parkpilot|\bpdc\b", "Radar de stationnement", Conduite),
    (r"anh(ä|ae)ngerkupplung|\bahk\b", "Attelage", Conduite),
    (r"allrad|4x4|quattro|4motion|xdrive", "Transmission intégrale", Conduite),
    (r"automatikgetriebe|\bautomatik\b", "Boîte automatique", Conduite),
    (r"schaltwippen", "Palettes au volant", Conduite),
    (r"start[\s/-]*stop", "Start & Stop", Conduite),
    (r"berganfahr", "Aide au démarrage en côte", Conduite),
    (r"luftfederung", "Suspension pneumatique", Conduite),
    (r"sportfahrwerk", "Châssis sport", Conduite),
    // Sécurité
    (r"\babs\b", "ABS", Securite),
    (r"\besp\b", "ESP", Securite),
    (r"airbag", "Airbags", Securite),
    (r"spurhalte|spurassist", "Aide au maintien de voie", Securite),
    (r"totwinkel|toter\s+winkel", "Surveillance des angles morts", Securite),
    (r"notbrems", "Freinage d'urgence automatique", Securite),
    (r"m(ü|ue)digkeit", "Détecteur de fatigue", Securite),
    (r"isofix", "Fixations Isofix", Securite),
    (r"reifendruck", "Contrôle de pression des pneus", Securite),
    (r"alarmanlage", "Alarme", Securite),
    (r"wegfahrsperre", "Antidémarrage", Securite),
    (r"verkehrszeichen", "Reconnaissance des panneaux", Securite),
    // Multimédia
    (r"navi", "GPS", Multimedia),
    (r"carplay", "Apple CarPlay", Multimedia),
    (r"android\s*auto", "Android Auto", Multimedia),
    (r"bluetooth", "Bluetooth", Multimedia),
    (r"freisprech", "Kit mains libres", Multimedia),
    (r"head[\s-]*up", "Affichage tête haute", Multimedia),
    (r"induktiv|kabellos", "Recharge sans fil", Multimedia),
    (r"\busb\b", "Prise USB", Multimedia),
    (r"\bdab\b|digitalradio", "Radio numérique DAB", Multimedia),
    (r"virtual\s+cockpit|digitales\s+cockpit|volldigital", "Combiné d'instruments numérique", Multimedia),
    (r"sprachsteuerung", "Commande vocale", Multimedia),
    (r"soundsystem|harman|bose|burmester|bang\s*&?\s*olufsen", "Système audio premium", Multimedia),
    // Extérieur
    (r"matrix", "Phares LED Matrix", Exterieur),
    (r"led[\s-]*scheinwerfer|voll[\s-]*led", "Phares LED", Exterieur),
    (r"xenon", "Phares xénon", Exterieur),
    (r"nebelscheinwerfer", "Antibrouillards", Exterieur),
    (r"leichtmetall|alufelgen|alu[\s-]*felgen", "Jantes alliage", Exterieur),
    (r"dachreling", "Barres de toit", Exterieur),
    (r"get(ö|oe)nte|privacy", "Vitres surteintées", Exterieur),
    (r"metallic", "Peinture métallisée", Exterieur),
    (r"heckklappe", "Hayon électrique", Exterieur),
    (r"regensensor", "Capteur de pluie", Exterieur),
    (r"lichtsensor|fahrlichtassistent", "Allumage automatique des feux", Exterieur),
    // Intérieur
    (r"teilleder", "Sellerie mi-cuir", Interieur),
    (r"lederlenkrad", "Volant cuir", Interieur),
    (r"multifunktionslenkrad", "Volant multifonction", Interieur),
    (r"leder", "Sellerie cuir", Interieur),
    (r"alcantara", "Sellerie Alcantara", Interieur),
    (r"ambiente", "Éclairage d'ambiance", Interieur),
    (r"sportsitze", "Sièges sport", Interieur),
    (r"mittelarmlehne", "Accoudoir central", Interieur),
    (r"umklappbar|geteilt\s+klappbar", "Banquette rabattable", Interieur),
];

static COMPILED_TERMS: LazyLock<Vec<(Regex, &'static str, Category)>> = LazyLock::new(|| {
    TERMS
        .iter()
        .filter_map(|(pattern, french, category)| {
            Regex::new(&format!("(?i){pattern}"))
                .map(|re| (re, *french, *category))
                .ok()
        })
        .collect()
});

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;|\n\r•·]+").expect("separator pattern is valid"));

/// Translate one German term, returning the French label and its category.
pub fn translate_term(term: &str) -> Option<(&'static str, Category)> {
    COMPILED_TERMS
        .iter()
        .find(|(re, _, _)| re.is_match(term))
        .map(|(_, french, category)| (*french, *category))
}

/// Categorized equipment extracted from a description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentList {
    /// French labels per category, deduplicated, in first-seen order
    pub categories: BTreeMap<Category, Vec<String>>,
    /// Fragments no pattern recognised, as written
    pub unmatched: Vec<String>,
}

impl EquipmentList {
    /// Number of recognised items.
    pub fn total(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.unmatched.is_empty()
    }

    pub fn items(&self, category: Category) -> &[String] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Split a dealer description into fragments and translate each one.
pub fn parse_equipment(text: &str) -> EquipmentList {
    let mut list = EquipmentList::default();

    for fragment in SEPARATORS.split(text) {
        let fragment = fragment.trim().trim_start_matches(['-', '*']).trim();
        if fragment.is_empty() {
            continue;
        }

        match translate_term(fragment) {
            Some((french, category)) => {
                let items = list.categories.entry(category).or_default();
                if !items.iter().any(|item| item == french) {
                    items.push(french.to_string());
                }
            }
            None => list.unmatched.push(fragment.to_string()),
        }
    }

    list
}
