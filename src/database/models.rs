use chrono::NaiveDateTime;

#[derive(Debug, Clone)]
pub struct CatalogBook {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub author: Option<String>,
    pub year: Option<String>,
    pub publisher: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}
