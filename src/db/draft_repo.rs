// src/db/draft_repo.rs
//
// Rascunhos persistidos como JSON, um arquivo por rascunho em DATA_DIR.

use std::path::PathBuf;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::draft::{Draft, DraftKind},
};

#[derive(Clone)]
pub struct DraftRepository {
    data_dir: PathBuf,
}

impl DraftRepository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    fn caminho(&self, id: Uuid) -> PathBuf {
        self.data_dir.join(format!("{id}.json"))
    }

    async fn salvar(&self, id: Uuid, draft: &Draft) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let json = serde_json::to_string_pretty(draft)?;
        tokio::fs::write(self.caminho(id), json).await?;
        Ok(())
    }

    /// Cria um rascunho vazio com a data de hoje.
    pub async fn create(&self, kind: DraftKind) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        let draft = Draft {
            kind,
            created_at: chrono::Local::now().date_naive().to_string(),
            data: Map::new(),
        };
        self.salvar(id, &draft).await?;
        Ok(id)
    }

    pub async fn get(&self, id: Uuid) -> Result<Draft, AppError> {
        let conteudo = match tokio::fs::read_to_string(self.caminho(id)).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::RascunhoNaoEncontrado);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&conteudo)?)
    }

    /// Mescla rasa: chaves de `dados` substituem as existentes em `data`.
    pub async fn patch(&self, id: Uuid, dados: Map<String, Value>) -> Result<Draft, AppError> {
        let mut draft = self.get(id).await?;
        draft.data.extend(dados);
        self.salvar(id, &draft).await?;
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapa(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn cria_le_e_mescla() {
        let dir = tempfile::tempdir().unwrap();
        let repo = DraftRepository::new(dir.path().join("rascunhos"));

        let id = repo.create(DraftKind::Anexo2).await.unwrap();
        let draft = repo.get(id).await.unwrap();
        assert_eq!(draft.kind, DraftKind::Anexo2);
        assert!(draft.data.is_empty());

        repo.patch(id, mapa(json!({"proposto": {"nome": "Ana"}, "passo": 2})))
            .await
            .unwrap();
        let draft = repo
            .patch(id, mapa(json!({"proposto": {"cpf": "52998224725"}})))
            .await
            .unwrap();

        // a chave inteira é substituída, sem mescla profunda
        assert_eq!(draft.data["proposto"], json!({"cpf": "52998224725"}));
        assert_eq!(draft.data["passo"], json!(2));
        assert_eq!(repo.get(id).await.unwrap(), draft);
    }

    #[tokio::test]
    async fn rascunho_inexistente() {
        let dir = tempfile::tempdir().unwrap();
        let repo = DraftRepository::new(dir.path());
        let err = repo.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::RascunhoNaoEncontrado));
        let err = repo.patch(Uuid::new_v4(), Map::new()).await.unwrap_err();
        assert!(matches!(err, AppError::RascunhoNaoEncontrado));
    }
}
