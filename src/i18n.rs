#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    En,
    Tr,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Tr => "tr",
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "tr" => Language::Tr,
            _ => Language::En,
        }
    }

    /// `auto` follows the system locale.
    pub fn from_setting(setting: &str) -> Self {
        if setting.eq_ignore_ascii_case("auto") {
            detect_system_language()
        } else {
            Language::from_code(&setting.to_lowercase())
        }
    }
}

pub fn detect_system_language() -> Language {
    if let Some(locale) = sys_locale::get_locale() {
        let lang = locale.split(['-', '_']).next().unwrap_or("en");
        Language::from_code(&lang.to_lowercase())
    } else {
        Language::En
    }
}

fn get_string(lang: Language, key: &str) -> &'static str {
    match lang {
        Language::En => en(key),
        Language::Tr => {
            let val = tr(key);
            if val.is_empty() { en(key) } else { val }
        }
    }
}

pub fn t(lang: Language, key: &str, vars: &[(&str, &str)]) -> String {
    let mut s = get_string(lang, key).to_string();
    for (k, v) in vars {
        s = s.replace(&format!("{{{{{}}}}}", k), v);
    }
    s
}

pub fn ts(lang: Language, key: &str) -> String {
    get_string(lang, key).to_string()
}

fn en(key: &str) -> &'static str {
    match key {
        "brand_portal" => "OpenData",
        "list_no_datasets" => "No datasets.",
        "list_no_match" => "No datasets match \"{{query}}\".",
        "list_count" => "{{shown}} of {{total}} datasets",
        "col_id" => "Dataset ID",
        "col_rows" => "Rows",
        "col_size" => "Size",
        "col_updated" => "Updated",
        "detail_not_found" => "Dataset \"{{id}}\" not found.",
        "detail_back" => "Back to list: #/",
        "field_updated" => "updated",
        "field_rows" => "rows",
        "field_size" => "size",
        "field_license" => "license",
        "field_frequency" => "frequency",
        "field_format" => "format",
        "field_version" => "version",
        "field_columns" => "columns",
        "field_source" => "source",
        "field_geo" => "geo",
        "field_repo" => "repo",
        "field_data" => "data",
        "section_usage" => "Usage",
        "section_preview" => "Preview",
        "section_schema" => "Schema",
        "section_readme" => "README",
        "panel_loading" => "Loading...",
        "panel_failed" => "Failed.",
        "panel_no_preview" => "No preview.",
        "panel_not_available" => "Not available.",
        "status_index" => "Index: {{url}}",
        "status_generated" => "generated {{date}}",
        "status_query" => "filter: \"{{query}}\"",
        "status_not_loaded" => "No index loaded.",
        "status_stale_discarded" => "Ignored {{count}} stale result(s).",
        "index_failed" => "Failed to load index.json",
        "index_tried" => "Tried {{location}} ({{origin}}): {{reason}}",
        "prompt_index" => "Index URL (empty to quit): ",
        "prompt_main" => "> ",
        "help" => "Commands: /<query> search, / clear search, #/d/<id> or open <id> show dataset, #/ or list show list, back, reload [url], help, quit",
        "unknown_command" => "Unknown command: {{command}} (type help)",
        "export_done" => "Wrote {{count}} pages to {{dir}}",
        "config_saved" => "Saved {{path}}",
        _ => "???",
    }
}

fn tr(key: &str) -> &'static str {
    match key {
        "brand_portal" => "OpenData",
        "list_no_datasets" => "Veri seti yok.",
        "list_no_match" => "\"{{query}}\" ile eslesen veri seti yok.",
        "list_count" => "{{shown}} / {{total}} veri seti",
        "col_id" => "Veri Seti",
        "col_rows" => "Satir",
        "col_size" => "Boyut",
        "col_updated" => "Guncelleme",
        "detail_not_found" => "\"{{id}}\" veri seti bulunamadi.",
        "detail_back" => "Listeye don: #/",
        "field_updated" => "guncelleme",
        "field_rows" => "satir",
        "field_size" => "boyut",
        "field_license" => "lisans",
        "field_frequency" => "siklik",
        "field_format" => "bicim",
        "field_version" => "surum",
        "field_columns" => "sutunlar",
        "field_source" => "kaynak",
        "field_repo" => "depo",
        "field_data" => "veri",
        "section_usage" => "Kullanim",
        "section_preview" => "Onizleme",
        "section_schema" => "Sema",
        "section_readme" => "BENIOKU",
        "panel_loading" => "Yukleniyor...",
        "panel_failed" => "Basarisiz.",
        "panel_no_preview" => "Onizleme yok.",
        "panel_not_available" => "Mevcut degil.",
        "status_index" => "Indeks: {{url}}",
        "status_generated" => "olusturuldu {{date}}",
        "status_query" => "filtre: \"{{query}}\"",
        "status_not_loaded" => "Indeks yuklenmedi.",
        "index_failed" => "index.json yuklenemedi",
        "index_tried" => "Denendi {{location}} ({{origin}}): {{reason}}",
        "prompt_index" => "Indeks URL (cikmak icin bos): ",
        "unknown_command" => "Bilinmeyen komut: {{command}} (help yazin)",
        "export_done" => "{{count}} sayfa {{dir}} dizinine yazildi",
        "config_saved" => "Kaydedildi {{path}}",
        _ => "",
    }
}
