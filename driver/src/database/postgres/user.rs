use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::query::UserQuery;
use kernel::interface::update::UserModifier;
use kernel::prelude::entity::{
    CreatedAt, Credential, HashedPassword, SelectLimit, SelectOffset, User, UserEmail, UserId,
    UserName, UserStream, UserYear,
};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresUserRepository;

#[async_trait::async_trait]
impl UserQuery for PostgresUserRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &UserId,
    ) -> error_stack::Result<Option<User>, KernelError> {
        PgUserInternal::find_by_id(con, id, false).await
    }

    async fn lock_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &UserId,
    ) -> error_stack::Result<Option<User>, KernelError> {
        PgUserInternal::find_by_id(con, id, true).await
    }

    async fn find_by_email(
        &self,
        con: &mut PostgresTransaction,
        email: &UserEmail,
    ) -> error_stack::Result<Option<User>, KernelError> {
        PgUserInternal::find_by_email(con, email).await
    }

    async fn find_credential(
        &self,
        con: &mut PostgresTransaction,
        email: &UserEmail,
    ) -> error_stack::Result<Option<Credential>, KernelError> {
        PgUserInternal::find_credential(con, email).await
    }

    async fn find_all(
        &self,
        con: &mut PostgresTransaction,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<User>, KernelError> {
        PgUserInternal::find_all(con, limit, offset).await
    }

    async fn count(&self, con: &mut PostgresTransaction) -> error_stack::Result<i64, KernelError> {
        PgUserInternal::count(con).await
    }
}

#[async_trait::async_trait]
impl UserModifier for PostgresUserRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        user: &User,
        password: &HashedPassword,
    ) -> error_stack::Result<(), KernelError> {
        PgUserInternal::create(con, user, password).await
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    stream: Option<String>,
    year: Option<String>,
    created_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = error_stack::Report<KernelError>;
    fn try_from(value: UserRow) -> Result<Self, Self::Error> {
        Ok(User::new(
            UserId::new(value.id),
            UserName::new(value.name),
            UserEmail::new(value.email),
            value.role.parse()?,
            value.stream.map(UserStream::new),
            value.year.map(UserYear::new),
            CreatedAt::new(value.created_at),
        ))
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: Uuid,
    password: String,
}

impl From<CredentialRow> for Credential {
    fn from(value: CredentialRow) -> Self {
        Credential::new(UserId::new(value.id), HashedPassword::new(value.password))
    }
}

pub(in crate::database) struct PgUserInternal;

impl PgUserInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &UserId,
        lock: bool,
    ) -> error_stack::Result<Option<User>, KernelError> {
        let query = if lock {
            // language=postgresql
            r#"
            SELECT id, name, email, role, stream, year, created_at
            FROM users
            WHERE id = $1
            FOR UPDATE
            "#
        } else {
            // language=postgresql
            r#"
            SELECT id, name, email, role, stream, year, created_at
            FROM users
            WHERE id = $1
            "#
        };
        let row = sqlx::query_as::<_, UserRow>(query)
            .bind(id.as_ref())
            .fetch_optional(con)
            .await
            .convert_error()?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_email(
        con: &mut PgConnection,
        email: &UserEmail,
    ) -> error_stack::Result<Option<User>, KernelError> {
        let row = sqlx::query_as::<_, UserRow>(
            // language=postgresql
            r#"
            SELECT id, name, email, role, stream, year, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(User::try_from).transpose()
    }

    async fn find_credential(
        con: &mut PgConnection,
        email: &UserEmail,
    ) -> error_stack::Result<Option<Credential>, KernelError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            // language=postgresql
            r#"
            SELECT id, password
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Credential::from))
    }

    async fn find_all(
        con: &mut PgConnection,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<User>, KernelError> {
        let rows = sqlx::query_as::<_, UserRow>(
            // language=postgresql
            r#"
            SELECT id, name, email, role, stream, year, created_at
            FROM users
            ORDER BY created_at, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit.as_ref())
        .bind(offset.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn count(con: &mut PgConnection) -> error_stack::Result<i64, KernelError> {
        // language=postgresql
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(con)
            .await
            .convert_error()
    }

    async fn create(
        con: &mut PgConnection,
        user: &User,
        password: &HashedPassword,
    ) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password, role, stream, year, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id().as_ref())
        .bind(user.name().as_ref())
        .bind(user.email().as_ref())
        .bind(password.as_ref())
        .bind(user.role().as_str())
        .bind(user.stream().as_ref().map(|stream| stream.as_ref().clone()))
        .bind(user.year().as_ref().map(|year| year.as_ref().clone()))
        .bind(user.created_at().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use time::OffsetDateTime;
    use uuid::Uuid;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::UserQuery;
    use kernel::interface::update::UserModifier;
    use kernel::prelude::entity::{
        CreatedAt, HashedPassword, Role, SelectLimit, SelectOffset, User, UserEmail, UserId,
        UserName, UserStream, UserYear,
    };
    use kernel::KernelError;

    use crate::database::postgres::user::PostgresUserRepository;
    use crate::database::postgres::PostgresDatabase;

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;
        let id = UserId::new(Uuid::new_v4());
        let email = UserEmail::new(format!("{}@college.edu", id.as_ref().simple()));

        let user = User::new(
            id.clone(),
            UserName::new("Asha"),
            email.clone(),
            Role::Student,
            Some(UserStream::new("CSE")),
            Some(UserYear::new("2")),
            CreatedAt::new(OffsetDateTime::now_utc().replace_nanosecond(0).unwrap()),
        );
        let password = HashedPassword::new("$2b$12$hash");
        PostgresUserRepository
            .create(&mut con, &user, &password)
            .await?;

        let found = PostgresUserRepository.find_by_id(&mut con, &id).await?;
        assert_eq!(found, Some(user.clone()));
        let found = PostgresUserRepository.find_by_email(&mut con, &email).await?;
        assert_eq!(found, Some(user.clone()));

        let total = PostgresUserRepository.count(&mut con).await?;
        assert!(total >= 1);
        let listed = PostgresUserRepository
            .find_all(&mut con, &SelectLimit::new(SelectLimit::MAX), &SelectOffset::default())
            .await?;
        assert!(!listed.is_empty());
        assert!(listed.iter().all(|listed| listed.email().as_ref() != ""));

        let credential = PostgresUserRepository
            .find_credential(&mut con, &email)
            .await?
            .unwrap();
        assert_eq!(credential.user_id(), &id);
        assert_eq!(credential.password(), &password);

        let duplicate = User::new(
            UserId::new(Uuid::new_v4()),
            UserName::new("Other"),
            email,
            Role::Student,
            None,
            None,
            CreatedAt::new(OffsetDateTime::now_utc()),
        );
        let error = PostgresUserRepository
            .create(&mut con, &duplicate, &password)
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Conflict);
        Ok(())
    }
}
