//! User-facing response messages.

/// Messages for one kind of entity.
#[derive(Debug, Clone, Copy)]
pub struct EntityMessages {
    pub created: &'static str,
    pub updated: &'static str,
    pub deleted: &'static str,
    pub not_found: &'static str,
    pub invalid_id: &'static str,
}

pub const USER: EntityMessages = EntityMessages {
    created: "Usuário criado com sucesso.",
    updated: "Usuário atualizado com sucesso.",
    deleted: "Usuário excluído com sucesso.",
    not_found: "Usuário não encontrado.",
    invalid_id: "Id de usuário inválido.",
};

pub const CATEGORY: EntityMessages = EntityMessages {
    created: "Categoria criada com sucesso.",
    updated: "Categoria atualizada com sucesso.",
    deleted: "Categoria excluída com sucesso.",
    not_found: "Categoria não encontrada.",
    invalid_id: "Id de categoria inválido.",
};

pub const FILE: EntityMessages = EntityMessages {
    created: "Arquivo criado com sucesso.",
    updated: "Arquivo atualizado com sucesso.",
    deleted: "Arquivo excluído com sucesso.",
    not_found: "Arquivo não encontrado.",
    invalid_id: "Id de arquivo inválido.",
};

pub const LOGIN_SUCCEEDED: &str = "Login realizado com sucesso.";
pub const BAD_REQUEST: &str = "Falha na requisição. Verifique os dados e tente novamente.";
pub const UNAUTHENTICATED: &str = "Acesso negado. Verifique suas credenciais.";
pub const NOT_FOUND: &str = "Recurso não encontrado.";
pub const DUPLICATE_USER: &str = "Já existe um usuário com este nome.";
pub const INTERNAL: &str = "Erro interno no sistema. Tente novamente.";
