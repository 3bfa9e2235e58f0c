// src/services/attachment_service.rs

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::get_rls_connection, error::AppError},
    db::{AttachmentRepository, PostRepository},
    middleware::tenancy::TenantContext,
    models::attachments::{Attachment, VirusScanStatus},
    storage::{SIGNED_URL_TTL, StorageBackend},
};

/// Limite de upload: 50MB, checado ANTES de qualquer chamada de rede.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Allow-list de tipos MIME aceitos no upload.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "text/plain",
    "text/csv",
];

/// Arquivo recebido no multipart, já inteiro na memória.
pub struct UploadFile {
    pub data: Vec<u8>,
    pub original_filename: String,
    pub mime_type: String,
}

/// Resultado do gate de download.
pub enum DownloadOutcome {
    /// 302 com a URL assinada (scan limpo).
    Redirect(String),
    /// 202 com os metadados (scan pendente + accept-pending=true).
    Processing(Attachment),
}

#[derive(Clone)]
pub struct AttachmentService {
    attachment_repo: AttachmentRepository,
    post_repo: PostRepository,
    storage: Arc<dyn StorageBackend>,
    pool: PgPool,
}

impl AttachmentService {
    pub fn new(
        attachment_repo: AttachmentRepository,
        post_repo: PostRepository,
        storage: Arc<dyn StorageBackend>,
        pool: PgPool,
    ) -> Self {
        Self {
            attachment_repo,
            post_repo,
            storage,
            pool,
        }
    }

    pub async fn upload(
        &self,
        ctx: &TenantContext,
        file: UploadFile,
        post_id: Option<Uuid>,
        comment_id: Option<Uuid>,
    ) -> Result<Attachment, AppError> {
        validate_upload(&file)?;

        let mut conn = get_rls_connection(&self.pool, ctx.tenant_id, ctx.user_id).await?;

        // O pai (se informado) precisa existir e ser visível no tenant.
        if let Some(post_id) = post_id {
            self.post_repo
                .find_post(&mut *conn, ctx.tenant_id, post_id)
                .await?
                .ok_or(AppError::NotFound("Post"))?;
        }
        if let Some(comment_id) = comment_id {
            let comment = self
                .post_repo
                .find_comment(&mut *conn, comment_id)
                .await?
                .ok_or(AppError::NotFound("Comentário"))?;
            self.post_repo
                .find_post(&mut *conn, ctx.tenant_id, comment.post_id)
                .await?
                .ok_or(AppError::NotFound("Comentário"))?;
        }

        let filename = generate_filename(&file.original_filename);

        self.storage
            .put_object(file.data.clone(), &filename, &file.mime_type)
            .await?;

        let download_url = self.storage.object_url(&filename);

        self.attachment_repo
            .create_attachment(
                &mut *conn,
                ctx.tenant_id,
                post_id,
                comment_id,
                ctx.user_id,
                &filename,
                &file.original_filename,
                file.data.len() as i64,
                &file.mime_type,
                &download_url,
            )
            .await
    }

    /// O gate de download: o pai precisa ser acessível, e o tri-estado do
    /// scan decide o desfecho (infected nunca sai; pending tranca).
    pub async fn download(
        &self,
        ctx: &TenantContext,
        attachment_id: Uuid,
        accept_pending: bool,
    ) -> Result<DownloadOutcome, AppError> {
        let mut conn = get_rls_connection(&self.pool, ctx.tenant_id, ctx.user_id).await?;

        let attachment = self
            .attachment_repo
            .find_attachment(&mut *conn, ctx.tenant_id, attachment_id)
            .await?
            .ok_or(AppError::NotFound("Anexo"))?;

        // Anexo sem pai é "avulso": gateado só pela membership no tenant
        // (que o TenantContext já garante).
        if let Some(post_id) = attachment.post_id {
            self.post_repo
                .find_post(&mut *conn, ctx.tenant_id, post_id)
                .await?
                .ok_or(AppError::NotFound("Anexo"))?;
        } else if let Some(comment_id) = attachment.comment_id {
            let comment = self
                .post_repo
                .find_comment(&mut *conn, comment_id)
                .await?
                .ok_or(AppError::NotFound("Anexo"))?;
            self.post_repo
                .find_post(&mut *conn, ctx.tenant_id, comment.post_id)
                .await?
                .ok_or(AppError::NotFound("Anexo"))?;
        }

        match scan_gate(attachment.virus_scan_status, accept_pending)? {
            ScanGate::Allow => {
                let url = self
                    .storage
                    .presigned_download_url(&attachment.filename, SIGNED_URL_TTL)
                    .await?;
                Ok(DownloadOutcome::Redirect(url))
            }
            ScanGate::Processing => Ok(DownloadOutcome::Processing(attachment)),
        }
    }

    /// Callback do scanner externo (fora de qualquer contexto de tenant).
    /// Devolve `false` quando a transição já tinha acontecido - o repo só
    /// sai de 'pending'.
    pub async fn apply_scan_result(
        &self,
        attachment_id: Uuid,
        status: VirusScanStatus,
    ) -> Result<bool, AppError> {
        if status == VirusScanStatus::Pending {
            return Err(AppError::BadRequest(
                "O resultado do scan deve ser 'clean' ou 'infected'.".to_string(),
            ));
        }

        self.attachment_repo
            .set_scan_status(&self.pool, attachment_id, status)
            .await
    }
}

/// Desfechos não-erro do gate (os erros saem direto como AppError).
enum ScanGate {
    Allow,
    Processing,
}

/// A decisão pura do tri-estado:
/// infected => 403 sempre; pending => 423, salvo opt-in explícito;
/// clean => download liberado.
fn scan_gate(status: VirusScanStatus, accept_pending: bool) -> Result<ScanGate, AppError> {
    match status {
        VirusScanStatus::Infected => Err(AppError::Forbidden(
            "Este arquivo foi marcado como infectado e não pode ser baixado.".to_string(),
        )),
        VirusScanStatus::Pending if accept_pending => Ok(ScanGate::Processing),
        VirusScanStatus::Pending => Err(AppError::ScanPending),
        VirusScanStatus::Clean => Ok(ScanGate::Allow),
    }
}

/// Checagens de upload na ordem do contrato: vazio -> tamanho -> MIME.
fn validate_upload(file: &UploadFile) -> Result<(), AppError> {
    if file.data.is_empty() {
        return Err(AppError::BadRequest(
            "O campo 'file' é obrigatório e não pode ser vazio.".to_string(),
        ));
    }
    if file.data.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::FileTooLarge);
    }
    if !ALLOWED_MIME_TYPES.contains(&file.mime_type.as_str()) {
        return Err(AppError::BadRequest(format!(
            "O tipo MIME '{}' não é permitido.",
            file.mime_type
        )));
    }
    Ok(())
}

/// Nome gerado resistente a colisão; a extensão original é preservada.
fn generate_filename(original: &str) -> String {
    let ext = original
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(char::is_alphanumeric));

    match ext {
        Some(ext) => format!("{}.{}", Uuid::new_v4().simple(), ext.to_lowercase()),
        None => Uuid::new_v4().simple().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(size: usize, mime: &str) -> UploadFile {
        UploadFile {
            data: vec![0u8; size],
            original_filename: "relatorio.pdf".to_string(),
            mime_type: mime.to_string(),
        }
    }

    #[test]
    fn arquivo_vazio_e_rejeitado() {
        let err = validate_upload(&upload(0, "application/pdf")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn arquivo_acima_de_50mb_e_413() {
        let err = validate_upload(&upload(MAX_UPLOAD_BYTES + 1, "application/pdf")).unwrap_err();
        assert!(matches!(err, AppError::FileTooLarge));
    }

    #[test]
    fn mime_fora_da_allow_list_e_rejeitado() {
        let err = validate_upload(&upload(10, "application/x-msdownload")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn upload_valido_passa() {
        assert!(validate_upload(&upload(10, "image/png")).is_ok());
    }

    #[test]
    fn infectado_nunca_baixa() {
        // Nem com accept_pending; infected é 403 incondicional.
        assert!(matches!(
            scan_gate(VirusScanStatus::Infected, false),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            scan_gate(VirusScanStatus::Infected, true),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn pendente_sem_opt_in_e_423() {
        assert!(matches!(
            scan_gate(VirusScanStatus::Pending, false),
            Err(AppError::ScanPending)
        ));
    }

    #[test]
    fn pendente_com_opt_in_devolve_metadados() {
        assert!(matches!(
            scan_gate(VirusScanStatus::Pending, true),
            Ok(ScanGate::Processing)
        ));
    }

    #[test]
    fn limpo_libera_o_download() {
        assert!(matches!(
            scan_gate(VirusScanStatus::Clean, false),
            Ok(ScanGate::Allow)
        ));
    }

    #[test]
    fn nome_gerado_preserva_extensao_e_nao_colide() {
        let a = generate_filename("foto.PNG");
        let b = generate_filename("foto.PNG");
        assert!(a.ends_with(".png"));
        assert_ne!(a, b);
    }

    #[test]
    fn nome_sem_extensao_nao_ganha_ponto() {
        let name = generate_filename("arquivo");
        assert!(!name.contains('.'));
    }
}
