use error_stack::{Report, ResultExt};
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::query::{
    BorrowQuery, DependOnBookQuery, DependOnBorrowQuery, DependOnUserQuery, UserQuery,
};
use kernel::interface::session::{DependOnSessionStore, SessionStore};
use kernel::interface::update::{DependOnUserModifier, UserModifier};
use kernel::prelude::access::{Action, Actor};
use kernel::prelude::entity::{
    AccessToken, BorrowStatus, CreatedAt, HashedPassword, Role, SelectLimit, SelectOffset, User,
    UserEmail, UserId, UserName, UserStream, UserYear,
};
use kernel::{KernelError, Rejection};

use crate::service::describe;
use crate::transfer::{
    AddLibrarianDto, AuthenticateDto, GetAllUserDto, LoginDto, LogoutDto, ProfileDto,
    RegisterDto, TokenDto, UserDto, UserListDto,
};

const MIN_PASSWORD_LENGTH: usize = 6;
const ALL_STATUSES: [BorrowStatus; 4] = [
    BorrowStatus::Requested,
    BorrowStatus::Issued,
    BorrowStatus::RequestedReturn,
    BorrowStatus::Returned,
];

async fn hash_password(password: String) -> error_stack::Result<HashedPassword, KernelError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(KernelError::Conflict.because(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(Report::from)
        .change_context(KernelError::Internal)?
        .map(HashedPassword::new)
        .map_err(Report::from)
        .change_context(KernelError::Internal)
}

async fn verify_password(
    password: String,
    hashed: HashedPassword,
) -> error_stack::Result<bool, KernelError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, hashed.as_ref()))
        .await
        .map_err(Report::from)
        .change_context(KernelError::Internal)?
        .map_err(Report::from)
        .change_context(KernelError::Internal)
}

#[async_trait::async_trait]
pub trait RegisterUserService: 'static + Sync + Send + DependOnUserQuery + DependOnUserModifier {
    /// Self-service sign up. The account is always a student.
    async fn register(&self, dto: RegisterDto) -> error_stack::Result<UserDto, KernelError> {
        let user = User::new(
            UserId::new(Uuid::new_v4()),
            UserName::new(dto.name),
            UserEmail::new(dto.email),
            Role::Student,
            dto.stream.map(UserStream::new),
            dto.year.map(UserYear::new),
            CreatedAt::new(OffsetDateTime::now_utc()),
        );
        self.enroll(user, dto.password).await
    }

    async fn add_librarian(
        &self,
        actor: &Actor,
        dto: AddLibrarianDto,
    ) -> error_stack::Result<UserDto, KernelError> {
        actor.authorize(Action::AddLibrarian)?;
        let user = User::new(
            UserId::new(Uuid::new_v4()),
            UserName::new(dto.name),
            UserEmail::new(dto.email),
            Role::Librarian,
            None,
            None,
            CreatedAt::new(OffsetDateTime::now_utc()),
        );
        self.enroll(user, dto.password).await
    }

    async fn enroll(&self, user: User, password: String) -> error_stack::Result<UserDto, KernelError> {
        let password = hash_password(password).await?;
        let mut connection = self.database_connection().transact().await?;
        if self
            .user_query()
            .find_by_email(&mut connection, user.email())
            .await?
            .is_some()
        {
            return Err(KernelError::Conflict.because("Email already exists"));
        }
        self.user_modifier()
            .create(&mut connection, &user, &password)
            .await?;
        connection.commit().await?;

        tracing::info!("{} account {} created", user.role(), user.id().as_ref());
        Ok(UserDto::from(user))
    }
}

impl<T> RegisterUserService for T where T: DependOnUserQuery + DependOnUserModifier {}

#[async_trait::async_trait]
pub trait SessionService: 'static + Sync + Send + DependOnUserQuery + DependOnSessionStore {
    async fn login(&self, dto: LoginDto) -> error_stack::Result<TokenDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let email = UserEmail::new(dto.email);
        let credential = self
            .user_query()
            .find_credential(&mut connection, &email)
            .await?
            .ok_or_else(|| KernelError::Unauthorized.because("Invalid email or password"))?;
        if !verify_password(dto.password, credential.password().clone()).await? {
            return Err(KernelError::Unauthorized.because("Invalid email or password"));
        }
        let user = self
            .user_query()
            .find_by_id(&mut connection, credential.user_id())
            .await?
            .ok_or_else(|| KernelError::Unauthorized.because("Invalid email or password"))?;

        let token = self.session_store().issue(user.id()).await?;
        tracing::info!("user {} logged in", user.id().as_ref());
        Ok(TokenDto {
            access_token: token.into(),
            user: UserDto::from(user),
        })
    }

    async fn logout(&self, dto: LogoutDto) -> error_stack::Result<(), KernelError> {
        self.session_store()
            .revoke(&AccessToken::new(dto.access_token))
            .await
    }

    /// Resolves a bearer token to the caller, with the role currently on record.
    async fn authenticate(&self, dto: AuthenticateDto) -> error_stack::Result<Actor, KernelError> {
        let token = AccessToken::new(dto.access_token);
        let user_id = self
            .session_store()
            .resolve(&token)
            .await?
            .ok_or_else(|| KernelError::Unauthorized.because("Invalid or expired token"))?;
        let mut connection = self.database_connection().transact().await?;
        let user = self
            .user_query()
            .find_by_id(&mut connection, &user_id)
            .await?
            .ok_or_else(|| KernelError::Unauthorized.because("Invalid or expired token"))?;
        Ok(Actor::new(user.id().clone(), *user.role()))
    }
}

impl<T> SessionService for T where T: DependOnUserQuery + DependOnSessionStore {}

#[async_trait::async_trait]
pub trait ProfileService:
    'static + Sync + Send + DependOnUserQuery + DependOnBookQuery + DependOnBorrowQuery
{
    /// The caller's account with every borrow record they ever made.
    async fn get_profile(&self, actor: &Actor) -> error_stack::Result<ProfileDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let user = self
            .user_query()
            .find_by_id(&mut connection, actor.id())
            .await?
            .ok_or_else(|| KernelError::NotFound.because("User not found"))?;
        let borrows = self
            .borrow_query()
            .find_by_user(&mut connection, actor.id(), &ALL_STATUSES)
            .await?;
        let borrows = describe(self, &mut connection, borrows, OffsetDateTime::now_utc()).await?;
        Ok(ProfileDto {
            user: UserDto::from(user),
            borrows,
        })
    }
}

impl<T> ProfileService for T where T: DependOnUserQuery + DependOnBookQuery + DependOnBorrowQuery {}

#[async_trait::async_trait]
pub trait UserDirectoryService: 'static + Sync + Send + DependOnUserQuery {
    async fn get_users(
        &self,
        actor: &Actor,
        dto: GetAllUserDto,
    ) -> error_stack::Result<UserListDto, KernelError> {
        actor.authorize(Action::ListUsers)?;
        let mut connection = self.database_connection().transact().await?;
        let limit = dto.limit.map(SelectLimit::new).unwrap_or_default();
        let offset = dto.offset.map(SelectOffset::new).unwrap_or_default();
        let users = self
            .user_query()
            .find_all(&mut connection, &limit, &offset)
            .await?;
        let total = self.user_query().count(&mut connection).await?;
        Ok(UserListDto {
            users: users.into_iter().map(UserDto::from).collect(),
            total,
        })
    }
}

impl<T> UserDirectoryService for T where T: DependOnUserQuery {}
