use sqlx::PgPool;

use crate::db::models::User;

const COLUMNS: &str = "\
    id, full_name, email, cpf, birth_date, phone, city, state, gender, \
    education_level, hashed_password, is_admin, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn email_taken(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1))")
        .bind(email)
        .fetch_one(pool)
        .await
}

pub(crate) async fn cpf_taken(pool: &PgPool, cpf: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE cpf = $1)")
        .bind(cpf)
        .fetch_one(pool)
        .await
}

pub(crate) struct CreateUser<'a> {
    pub(crate) id: &'a str,
    pub(crate) full_name: &'a str,
    pub(crate) email: &'a str,
    pub(crate) cpf: &'a str,
    pub(crate) birth_date: time::Date,
    pub(crate) phone: Option<&'a str>,
    pub(crate) city: Option<&'a str>,
    pub(crate) state: Option<&'a str>,
    pub(crate) gender: Option<&'a str>,
    pub(crate) education_level: Option<&'a str>,
    pub(crate) hashed_password: String,
    pub(crate) is_admin: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateUser<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (
            id, full_name, email, cpf, birth_date, phone, city, state, gender,
            education_level, hashed_password, is_admin, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$13)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.full_name)
    .bind(params.email)
    .bind(params.cpf)
    .bind(params.birth_date)
    .bind(params.phone)
    .bind(params.city)
    .bind(params.state)
    .bind(params.gender)
    .bind(params.education_level)
    .bind(params.hashed_password)
    .bind(params.is_admin)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn update_password(
    pool: &PgPool,
    id: &str,
    hashed_password: &str,
    updated_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET hashed_password = $1, updated_at = $2 WHERE id = $3")
        .bind(hashed_password)
        .bind(updated_at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub(crate) async fn set_admin(
    pool: &PgPool,
    id: &str,
    is_admin: bool,
    updated_at: time::PrimitiveDateTime,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET is_admin = $1, updated_at = $2 WHERE id = $3 RETURNING {COLUMNS}"
    ))
    .bind(is_admin)
    .bind(updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list(pool: &PgPool, skip: i64, limit: i64) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users ORDER BY full_name, id OFFSET $1 LIMIT $2"
    ))
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users").fetch_one(pool).await
}
