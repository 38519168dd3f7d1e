use actix_web::{web, HttpResponse};
use log::info;
use serde_derive::Deserialize;

use db::models::NewVerse;
use db::SwordDrillable;

use crate::error::{Error, JsonError};
use crate::responder::{SearchResultData, StatusData};
use crate::ServerData;

/// Query parameters for the passage endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PassageQuery {
    pub translation: Option<String>,
}

/// Query parameters for the search endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Body of the add verse endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewVerseRequest {
    pub book_id: String,
    pub book_name: String,
    pub chapter: i32,
    pub verse: i32,
    pub text: String,
    pub translation_id: Option<String>,
}

impl NewVerseRequest {
    /// Checks required fields, filling in the default translation.
    pub fn validate(self, default_translation: &str) -> Result<NewVerse, Error> {
        if self.book_id.trim().is_empty()
            || self.text.trim().is_empty()
            || self.chapter <= 0
            || self.verse <= 0
        {
            return Err(Error::InvalidRequest {
                message: "Missing required fields: book_id, text, chapter, verse".to_string(),
            });
        }

        let translation_id = match self.translation_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => default_translation.to_string(),
        };

        Ok(NewVerse {
            translation_id,
            book_id: self.book_id,
            book_name: self.book_name,
            chapter: self.chapter,
            verse: self.verse,
            text: self.text,
        })
    }
}

/// `GET /{reference}`: resolves a reference into a passage.
pub async fn passage<S>(
    data: web::Data<ServerData<S>>,
    reference: web::Path<String>,
    query: web::Query<PassageQuery>,
) -> Result<HttpResponse, JsonError>
where
    S: SwordDrillable + 'static,
{
    // Form-style encoding: "Genesis+1:1" reads as "Genesis 1:1"
    let reference = reference.into_inner().replace('+', " ");
    let translation = query.into_inner().translation;

    let passage = web::block(move || {
        data.assembler
            .resolve(&reference, translation.as_deref(), &data.drill, &data.drill)
    })
    .await??;

    Ok(HttpResponse::Ok().json(passage))
}

/// `GET /api/translations`
pub async fn translations<S>(data: web::Data<ServerData<S>>) -> Result<HttpResponse, JsonError>
where
    S: SwordDrillable + 'static,
{
    let translations = web::block(move || data.drill.all_translations()).await??;
    Ok(HttpResponse::Ok().json(translations))
}

/// `GET /api/books`
pub async fn books<S>(data: web::Data<ServerData<S>>) -> Result<HttpResponse, JsonError>
where
    S: SwordDrillable + 'static,
{
    let books = web::block(move || data.drill.all_books()).await??;
    Ok(HttpResponse::Ok().json(books))
}

/// `GET /api/search?q=`
pub async fn search<S>(
    data: web::Data<ServerData<S>>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, JsonError>
where
    S: SwordDrillable + 'static,
{
    let q = match query.into_inner().q {
        Some(q) if !q.trim().is_empty() => q,
        _ => {
            return Err(Error::InvalidRequest {
                message: "Query parameter 'q' is required".to_string(),
            }
            .into())
        }
    };

    let results = {
        let q = q.clone();
        web::block(move || data.drill.search(&q)).await??
    };

    Ok(HttpResponse::Ok().json(SearchResultData::new(q, results)))
}

/// `POST /api/verses`
pub async fn add_verse<S>(
    data: web::Data<ServerData<S>>,
    body: web::Json<NewVerseRequest>,
) -> Result<HttpResponse, JsonError>
where
    S: SwordDrillable + 'static,
{
    let verse = body
        .into_inner()
        .validate(data.assembler.default_translation())?;
    info!(
        "Adding {} {}:{} ({})",
        verse.book_id, verse.chapter, verse.verse, verse.translation_id
    );

    web::block(move || data.drill.add_verse(verse)).await??;
    Ok(HttpResponse::Ok().json(StatusData::success()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NewVerseRequest {
        NewVerseRequest {
            book_id: "GEN".to_string(),
            book_name: "Genesis".to_string(),
            chapter: 1,
            verse: 6,
            text: "And God said".to_string(),
            translation_id: None,
        }
    }

    #[test]
    fn validate_fills_translation() {
        let verse = request().validate("en").unwrap();
        assert_eq!(verse.translation_id, "en");

        let verse = NewVerseRequest {
            translation_id: Some("kjv".to_string()),
            ..request()
        }
        .validate("en")
        .unwrap();
        assert_eq!(verse.translation_id, "kjv");
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let invalid = vec![
            NewVerseRequest {
                book_id: "".to_string(),
                ..request()
            },
            NewVerseRequest {
                text: "  ".to_string(),
                ..request()
            },
            NewVerseRequest {
                chapter: 0,
                ..request()
            },
            NewVerseRequest {
                verse: -1,
                ..request()
            },
        ];

        for req in invalid {
            assert!(matches!(
                req.validate("en"),
                Err(Error::InvalidRequest { .. })
            ));
        }
    }
}
