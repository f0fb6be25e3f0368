//! Résumé textuel court d'une fiche de métriques (texte russe du rapport)

use crate::types::MetricRecord;

/// Balisage du résumé
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Markup {
    /// Total en gras (`<b>`), pour les messageries qui acceptent le HTML
    #[default]
    Html,
    Plain,
}

const NO_ADDRESS: &str = "нет адреса";
const UNKNOWN: &str = "—";

/// Rend le résumé : lieu, surface, score, distances et indicateurs
pub fn render_summary(record: &MetricRecord, location: &str, markup: Markup) -> String {
    let location = match (location.trim(), markup) {
        ("", _) => NO_ADDRESS.to_string(),
        (loc, Markup::Html) => escape_html(loc),
        (loc, Markup::Plain) => loc.to_string(),
    };

    let total = format!("{}/100", record.score.total);
    let total = match markup {
        Markup::Html => format!("<b>{}</b>", total),
        Markup::Plain => total,
    };

    let touch = if record.touches_road { "Да" } else { "Нет" };
    let house = if record.can_house_10x10 {
        "Да"
    } else {
        "Сомнительно"
    };

    format!(
        "📍 {}\n\
         Площадь: {:.2} га\n\
         Скоринг: {} (доступ {:.0}, уклон {:.0}, вода {:.0}, инфра {:.0})\n\
         Дорога: {} | Вода: {} | Касание дороги: {} | Дом 10×10: {}",
        location,
        record.area_ha,
        total,
        record.score.access,
        record.score.slope,
        record.score.flood,
        record.score.infra,
        meters(record.d_road_m),
        meters(record.d_water_m),
        touch,
        house,
    )
}

/// Échappe `&`, `<` et `>` pour les parseurs HTML des messageries
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Distance arrondie au mètre inférieur, ou tiret si inconnue
fn meters(distance: Option<f64>) -> String {
    match distance {
        Some(d) => format!("{} м", d.floor() as i64),
        None => UNKNOWN.to_string(),
    }
}
