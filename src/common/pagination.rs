// src/common/pagination.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::common::error::AppError;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Parâmetros de página já validados (limit em [1, 100], offset >= 0).
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub limit: i64,
    pub offset: i64,
}

impl PageParams {
    pub fn from_query(limit: Option<i64>, offset: Option<i64>) -> Result<Self, AppError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::BadRequest(format!(
                "O parâmetro 'limit' deve estar entre 1 e {}.",
                MAX_LIMIT
            )));
        }

        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(AppError::BadRequest(
                "O parâmetro 'offset' deve ser maior ou igual a zero.".to_string(),
            ));
        }

        Ok(Self { limit, offset })
    }
}

/// Bloco `pagination` devolvido nas listagens.
#[derive(Debug, Serialize, ToSchema)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(total: i64, page: PageParams) -> Self {
        Self {
            total,
            limit: page.limit,
            offset: page.offset,
            has_more: page.offset.saturating_add(page.limit) < total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_padrao_e_20() {
        let page = PageParams::from_query(None, None).unwrap();
        assert_eq!(page.limit, 20);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn limit_fora_da_faixa_e_rejeitado() {
        assert!(PageParams::from_query(Some(0), None).is_err());
        assert!(PageParams::from_query(Some(101), None).is_err());
        assert!(PageParams::from_query(Some(100), None).is_ok());
        assert!(PageParams::from_query(Some(1), None).is_ok());
    }

    #[test]
    fn offset_negativo_e_rejeitado() {
        assert!(PageParams::from_query(None, Some(-1)).is_err());
    }

    #[test]
    fn has_more_no_meio_da_lista() {
        let page = PageParams::from_query(Some(10), Some(20)).unwrap();
        let p = Pagination::new(45, page);
        assert!(p.has_more);
    }

    #[test]
    fn has_more_na_ultima_pagina() {
        let page = PageParams::from_query(Some(10), Some(40)).unwrap();
        let p = Pagination::new(45, page);
        assert!(!p.has_more);
    }

    #[test]
    fn offset_gigante_nao_estoura() {
        // offset absurdo mas aceito: a soma satura em vez de dar overflow.
        let page = PageParams::from_query(Some(100), Some(i64::MAX - 1)).unwrap();
        let p = Pagination::new(45, page);
        assert!(!p.has_more);
    }
}
