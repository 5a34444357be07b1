use actix_web::{web, HttpRequest, HttpResponse, Responder};
use bcrypt::{hash, verify, DEFAULT_COST};
use log::{error, info};
use sqlx::MySqlPool;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::auth_models::{
    AutoLoginRequest, AutoLoginResponse,
    ChangePasswordRequest, ChangePasswordResponse,
    CheckEmailRequest, CheckEmailResponse,
    CheckUsernameRequest, CheckUsernameResponse,
    LoginRequest, LoginResponse,
    LogoutRequest, LogoutResponse,
    ProfileRequest, ProfileResponse, UserProfile,
    RegisterRequest, RegisterResponse,
    UpdateProfileRequest, UpdateProfileResponse,
};
use crate::forms;
use crate::models::user::User;
use crate::routes::guard;

pub async fn auth_get() -> impl Responder {
    info!("Received request on /auth_get endpoint");
    HttpResponse::Ok().body("Hello, this is the Storyboard auth endpoint.")
}

// Check if username is unique
pub async fn check_username(
    pool: web::Data<MySqlPool>,
    req: web::Json<CheckUsernameRequest>,
) -> impl Responder {
    let username = &req.username;
    info!("Received request to check username: {}", username);
    let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM Users_ WHERE user_name = ?")
        .bind(username)
        .fetch_one(pool.get_ref())
        .await;

    match result {
        Ok(count) => {
            let is_unique = count == 0;
            info!("Username {} is unique: {}", username, is_unique);
            HttpResponse::Ok().json(CheckUsernameResponse { is_unique })
        }
        Err(e) => {
            error!("Failed to execute query: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

// Check if email is unique
pub async fn check_email(
    pool: web::Data<MySqlPool>,
    req: web::Json<CheckEmailRequest>,
) -> impl Responder {
    let email = &req.email;
    info!("Received request to check email: {}", email);
    let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM Users_ WHERE user_email = ?")
        .bind(email)
        .fetch_one(pool.get_ref())
        .await;

    match result {
        Ok(count) => {
            let is_unique = count == 0;
            info!("Email {} is unique: {}", email, is_unique);
            HttpResponse::Ok().json(CheckEmailResponse { is_unique })
        }
        Err(e) => {
            error!("Failed to execute query: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

// Register a user. The account is created inactive and has to be activated
// before the first login.
pub async fn register(
    pool: web::Data<MySqlPool>,
    req: web::Json<RegisterRequest>,
) -> impl Responder {
    let username = &req.username;
    info!("Received request to register user: {}", username);

    // 1. Validate the signup form before touching the database
    let field_errors = forms::validate_signup(
        username,
        &req.email,
        &req.password,
        &req.password_confirm,
        &req.role,
    );
    if !field_errors.is_empty() {
        return HttpResponse::BadRequest().json(RegisterResponse {
            success: false,
            message: "Validation failed".into(),
            field_errors,
        });
    }

    // 2. Reject a taken username up front so the client gets a field error
    let taken = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM Users_ WHERE user_name = ?")
        .bind(username)
        .fetch_one(pool.get_ref())
        .await;
    match taken {
        Ok(0) => {}
        Ok(_) => {
            info!("Username {} is already taken", username);
            return HttpResponse::BadRequest().json(RegisterResponse {
                success: false,
                message: "Username is already taken".into(),
                field_errors: Vec::new(),
            });
        }
        Err(e) => {
            error!("Failed to execute query: {}", e);
            return HttpResponse::InternalServerError().json(RegisterResponse {
                success: false,
                message: "Failed to register user".into(),
                field_errors: Vec::new(),
            });
        }
    }

    // 3. Encrypt password with bcrypt
    let hashed_password = match hash(&req.password, DEFAULT_COST) {
        Ok(hp) => hp,
        Err(e) => {
            error!("Failed to hash password: {}", e);
            return HttpResponse::InternalServerError().json(RegisterResponse {
                success: false,
                message: "Failed to hash password".into(),
                field_errors: Vec::new(),
            });
        }
    };

    // 4. Insert the inactive account
    let result = sqlx::query(
        "INSERT INTO Users_ (user_name, user_email, first_name, last_name, password_hash, default_role, is_active)
         VALUES (?, ?, ?, ?, ?, ?, FALSE)",
    )
    .bind(username)
    .bind(&req.email)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(&hashed_password)
    .bind(&req.role)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => {
            info!("User {} registered successfully", username);
            HttpResponse::Ok().json(RegisterResponse {
                success: true,
                message: "User registered successfully, awaiting activation".into(),
                field_errors: Vec::new(),
            })
        }
        Err(e) => {
            error!("Failed to execute query: {}", e);
            HttpResponse::InternalServerError().json(RegisterResponse {
                success: false,
                message: "Failed to register user".into(),
                field_errors: Vec::new(),
            })
        }
    }
}

// login logic
pub async fn login(
    pool: web::Data<MySqlPool>,
    req: web::Json<LoginRequest>,
) -> impl Responder {
    let username = &req.username;
    let password = &req.password;
    info!("Received login request for user: {}", username);

    // 1. Get the user data from the database with username
    let result = sqlx::query_as::<_, (i32, String, bool)>(
        "SELECT user_id, password_hash, is_active FROM Users_ WHERE user_name = ?",
    )
    .bind(username)
    .fetch_one(pool.get_ref())
    .await;

    let (user_id, password_hash, is_active) = match result {
        Ok(user) => user,
        Err(_) => {
            info!("Invalid username: {}", username);
            return HttpResponse::Unauthorized().json(LoginResponse {
                success: false,
                message: "Invalid username".into(),
            });
        }
    };

    // 2. Validate hashed password in DB and given password
    let valid = match verify(password, &password_hash) {
        Ok(valid) => valid,
        Err(_) => {
            error!("Error when checking password for user: {}", username);
            return HttpResponse::Unauthorized().json(LoginResponse {
                success: false,
                message: "Error when checking password".into(),
            });
        }
    };

    if !valid {
        info!("Invalid password for user: {}", username);
        return HttpResponse::Unauthorized().json(LoginResponse {
            success: false,
            message: "Invalid password".into(),
        });
    }

    // 3. Inactive accounts cannot sign in
    if !is_active {
        info!("Account {} is not activated yet", username);
        return HttpResponse::Unauthorized().json(LoginResponse {
            success: false,
            message: "Account is not activated yet".into(),
        });
    }

    // 4. Generate a new session ID
    let new_session_id = Uuid::new_v4().to_string();
    let expires_at = if req.remember_me {
        OffsetDateTime::now_utc() + Duration::days(10)
    } else {
        OffsetDateTime::now_utc() + Duration::minutes(30)
    };

    // 5. Check if user already has a session
    let session_check = sqlx::query_as::<_, (String, OffsetDateTime)>(
        "SELECT session_id, expires_at FROM Sessions_ WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool.get_ref())
    .await;

    match session_check {
        Ok(Some((_, existing_expiry))) => {
            // Session exists, check if it has expired
            if OffsetDateTime::now_utc() < existing_expiry {
                info!("User {} already has an active session", username);
                return HttpResponse::BadRequest().json(LoginResponse {
                    success: false,
                    message: "User already has an active session".into(),
                });
            }

            // Update the expired session with a new session ID and expiration
            let update_result = sqlx::query(
                "UPDATE Sessions_ SET session_id = ?, expires_at = ?, is_persistent = ? WHERE user_id = ?",
            )
            .bind(&new_session_id)
            .bind(expires_at)
            .bind(req.remember_me)
            .bind(user_id)
            .execute(pool.get_ref())
            .await;

            if let Err(e) = update_result {
                error!("Failed to update session for user {}: {}", username, e);
                return HttpResponse::InternalServerError().json(LoginResponse {
                    success: false,
                    message: "Failed to update session".into(),
                });
            }
        }
        Ok(None) => {
            // No session found, insert a new one
            let insert_result = sqlx::query(
                "INSERT INTO Sessions_ (session_id, user_id, expires_at, is_persistent) VALUES (?, ?, ?, ?)",
            )
            .bind(&new_session_id)
            .bind(user_id)
            .bind(expires_at)
            .bind(req.remember_me)
            .execute(pool.get_ref())
            .await;

            if let Err(e) = insert_result {
                error!("Failed to insert session for user {}: {}", username, e);
                return HttpResponse::InternalServerError().json(LoginResponse {
                    success: false,
                    message: "Failed to create session".into(),
                });
            }
        }
        Err(e) => {
            error!("Failed to query session for user {}: {}", username, e);
            return HttpResponse::InternalServerError().json(LoginResponse {
                success: false,
                message: "Failed to check session".into(),
            });
        }
    };

    // 6. Return session ID inside a cookie to the client
    info!("User {} logged in successfully", username);
    HttpResponse::Ok()
        .cookie(
            actix_web::cookie::Cookie::build("session_id", new_session_id.clone())
                .http_only(true)
                .finish(),
        )
        .json(LoginResponse {
            success: true,
            message: "Login successful".into(),
        })
}

// auto_login logic
pub async fn auto_login(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    _: web::Json<AutoLoginRequest>,
) -> impl Responder {
    // 1. Receive the session ID from the cookie
    let session_id = match req.cookie("session_id") {
        Some(cookie) => cookie.value().to_string(),
        None => {
            info!("Session ID not found in cookies for auto login");
            return HttpResponse::BadRequest().json(AutoLoginResponse {
                success: false,
                message: "Session ID not found in cookies".into(),
                username: "".into(),
            });
        }
    };

    info!("Received auto login request with session ID: {}", session_id);

    // 2. Check whether session ID is valid
    let session_result = sqlx::query_as::<_, (i32, OffsetDateTime)>(
        "SELECT user_id, expires_at FROM Sessions_ WHERE session_id = ?",
    )
    .bind(&session_id)
    .fetch_optional(pool.get_ref())
    .await;

    match session_result {
        Ok(Some((user_id, expires_at))) => {
            // Check if the session has expired
            if expires_at < OffsetDateTime::now_utc() {
                // Remove expired session
                let _ = sqlx::query("DELETE FROM Sessions_ WHERE session_id = ?")
                    .bind(&session_id)
                    .execute(pool.get_ref())
                    .await;

                info!("Session expired for session ID: {}", session_id);
                return HttpResponse::Unauthorized().json(AutoLoginResponse {
                    success: false,
                    message: "Login is needed, session expired".into(),
                    username: "".into(),
                });
            }

            // 3. If the session ID is valid, fetch the user associated with it
            let user_result =
                sqlx::query_scalar::<_, String>("SELECT user_name FROM Users_ WHERE user_id = ?")
                    .bind(user_id)
                    .fetch_one(pool.get_ref())
                    .await;

            match user_result {
                Ok(user_name) => {
                    // 4. Return with session ID inside cookie
                    info!("Auto login successful for user: {}", user_name);
                    HttpResponse::Ok()
                        .cookie(
                            actix_web::cookie::Cookie::build("session_id", session_id.clone())
                                .http_only(true)
                                .finish(),
                        )
                        .json(AutoLoginResponse {
                            success: true,
                            message: format!("Welcome back, {}", user_name),
                            username: user_name,
                        })
                }
                Err(e) => {
                    error!(
                        "Failed to fetch user information for session ID {}: {}",
                        session_id, e
                    );
                    HttpResponse::InternalServerError().json(AutoLoginResponse {
                        success: false,
                        message: "Failed to fetch user information".into(),
                        username: "".into(),
                    })
                }
            }
        }
        Ok(None) => {
            info!("Invalid session ID: {}", session_id);
            HttpResponse::BadRequest().json(AutoLoginResponse {
                success: false,
                message: "Invalid session ID".into(),
                username: "".into(),
            })
        }
        Err(e) => {
            error!("Failed to validate session ID {}: {}", session_id, e);
            HttpResponse::InternalServerError().json(AutoLoginResponse {
                success: false,
                message: "Failed to validate session".into(),
                username: "".into(),
            })
        }
    }
}

pub async fn logout(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    _: web::Json<LogoutRequest>,
) -> impl Responder {
    // 1. Receive the session ID from the cookie
    let session_id = match req.cookie("session_id") {
        Some(cookie) => cookie.value().to_string(),
        None => {
            info!("Session ID does not exist in cookies for logout");
            return HttpResponse::BadRequest().json(LogoutResponse {
                success: false,
                message: "Session ID does not exist".into(),
            });
        }
    };

    info!("Received logout request with session ID: {}", session_id);

    // 2. Check whether the session exists and is valid
    let session_result =
        sqlx::query_scalar::<_, OffsetDateTime>("SELECT expires_at FROM Sessions_ WHERE session_id = ?")
            .bind(&session_id)
            .fetch_optional(pool.get_ref())
            .await;

    match session_result {
        Ok(Some(expires_at)) => {
            // 2-1. If session is expired, return failure
            if expires_at < OffsetDateTime::now_utc() {
                info!("Session already expired for session ID: {}", session_id);
                return HttpResponse::BadRequest().json(LogoutResponse {
                    success: false,
                    message: "Already expired session".into(),
                });
            }

            // 2-2. Otherwise delete the session
            let delete_result = sqlx::query("DELETE FROM Sessions_ WHERE session_id = ?")
                .bind(&session_id)
                .execute(pool.get_ref())
                .await;

            match delete_result {
                Ok(_) => {
                    info!("Logout successful for session ID: {}", session_id);
                    HttpResponse::Ok().json(LogoutResponse {
                        success: true,
                        message: "Logout successful".into(),
                    })
                }
                Err(e) => {
                    error!("Failed to delete session ID {}: {}", session_id, e);
                    HttpResponse::InternalServerError().json(LogoutResponse {
                        success: false,
                        message: "Failed to logout".into(),
                    })
                }
            }
        }
        Ok(None) => {
            info!("Session not found for session ID: {}", session_id);
            HttpResponse::BadRequest().json(LogoutResponse {
                success: false,
                message: "Session not found".into(),
            })
        }
        Err(e) => {
            error!("Failed to fetch session ID {}: {}", session_id, e);
            HttpResponse::InternalServerError().json(LogoutResponse {
                success: false,
                message: "Failed to check session".into(),
            })
        }
    }
}

// Return the signed-in user's profile, used to pre-fill the profile form
pub async fn get_profile(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    _: web::Json<ProfileRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(e) => return guard::deny(e),
    };

    let result = sqlx::query_as::<_, User>(
        "SELECT user_id, user_name, user_email, first_name, last_name, password_hash, default_role, is_active
         FROM Users_ WHERE user_id = ?",
    )
    .bind(user.user_id)
    .fetch_one(pool.get_ref())
    .await;

    match result {
        Ok(record) => HttpResponse::Ok().json(ProfileResponse {
            success: true,
            message: "".into(),
            profile: Some(UserProfile {
                user_name: record.user_name,
                user_email: record.user_email,
                first_name: record.first_name,
                last_name: record.last_name,
                default_role: record.default_role,
            }),
        }),
        Err(e) => {
            error!("Failed to fetch profile for user {}: {}", user.user_name, e);
            HttpResponse::InternalServerError().json(ProfileResponse {
                success: false,
                message: "Failed to fetch profile".into(),
                profile: None,
            })
        }
    }
}

// Update name, email and username of the signed-in user
pub async fn update_profile(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<UpdateProfileRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(e) => return guard::deny(e),
    };

    let field_errors = forms::validate_profile(&request.username, &request.email);
    if !field_errors.is_empty() {
        return HttpResponse::BadRequest().json(UpdateProfileResponse {
            success: false,
            message: "Validation failed".into(),
            field_errors,
        });
    }

    // A changed username must stay unique
    if request.username != user.user_name {
        let taken = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM Users_ WHERE user_name = ? AND user_id != ?",
        )
        .bind(&request.username)
        .bind(user.user_id)
        .fetch_one(pool.get_ref())
        .await;

        match taken {
            Ok(0) => {}
            Ok(_) => {
                info!("Username {} is already taken", request.username);
                return HttpResponse::BadRequest().json(UpdateProfileResponse {
                    success: false,
                    message: "Username is already taken".into(),
                    field_errors: Vec::new(),
                });
            }
            Err(e) => {
                error!("Failed to execute query: {}", e);
                return HttpResponse::InternalServerError().json(UpdateProfileResponse {
                    success: false,
                    message: "Failed to update profile".into(),
                    field_errors: Vec::new(),
                });
            }
        }
    }

    let result = sqlx::query(
        "UPDATE Users_ SET user_name = ?, user_email = ?, first_name = ?, last_name = ? WHERE user_id = ?",
    )
    .bind(&request.username)
    .bind(&request.email)
    .bind(&request.first_name)
    .bind(&request.last_name)
    .bind(user.user_id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => {
            info!("Profile updated for user {}", request.username);
            HttpResponse::Ok().json(UpdateProfileResponse {
                success: true,
                message: "Profile updated successfully".into(),
                field_errors: Vec::new(),
            })
        }
        Err(e) => {
            error!("Failed to update profile for user {}: {}", user.user_name, e);
            HttpResponse::InternalServerError().json(UpdateProfileResponse {
                success: false,
                message: "Failed to update profile".into(),
                field_errors: Vec::new(),
            })
        }
    }
}

// Change the signed-in user's password after verifying the old one
pub async fn change_password(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<ChangePasswordRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(e) => return guard::deny(e),
    };

    let field_errors =
        forms::validate_password_change(&request.new_password, &request.new_password_confirm);
    if !field_errors.is_empty() {
        return HttpResponse::BadRequest().json(ChangePasswordResponse {
            success: false,
            message: "Validation failed".into(),
            field_errors,
        });
    }

    // 1. Fetch and verify the current password hash
    let hash_result =
        sqlx::query_scalar::<_, String>("SELECT password_hash FROM Users_ WHERE user_id = ?")
            .bind(user.user_id)
            .fetch_one(pool.get_ref())
            .await;

    let password_hash = match hash_result {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to fetch password hash for {}: {}", user.user_name, e);
            return HttpResponse::InternalServerError().json(ChangePasswordResponse {
                success: false,
                message: "Failed to change password".into(),
                field_errors: Vec::new(),
            });
        }
    };

    let valid = match verify(&request.old_password, &password_hash) {
        Ok(valid) => valid,
        Err(_) => {
            error!("Error when checking password for user: {}", user.user_name);
            return HttpResponse::Unauthorized().json(ChangePasswordResponse {
                success: false,
                message: "Error when checking password".into(),
                field_errors: Vec::new(),
            });
        }
    };

    if !valid {
        info!("Old password mismatch for user: {}", user.user_name);
        return HttpResponse::Unauthorized().json(ChangePasswordResponse {
            success: false,
            message: "Old password is incorrect".into(),
            field_errors: Vec::new(),
        });
    }

    // 2. Hash and store the new password
    let new_hash = match hash(&request.new_password, DEFAULT_COST) {
        Ok(hp) => hp,
        Err(e) => {
            error!("Failed to hash password: {}", e);
            return HttpResponse::InternalServerError().json(ChangePasswordResponse {
                success: false,
                message: "Failed to hash password".into(),
                field_errors: Vec::new(),
            });
        }
    };

    let update_result = sqlx::query("UPDATE Users_ SET password_hash = ? WHERE user_id = ?")
        .bind(&new_hash)
        .bind(user.user_id)
        .execute(pool.get_ref())
        .await;

    match update_result {
        Ok(_) => {
            info!("Password changed for user {}", user.user_name);
            HttpResponse::Ok().json(ChangePasswordResponse {
                success: true,
                message: "Password changed successfully".into(),
                field_errors: Vec::new(),
            })
        }
        Err(e) => {
            error!("Failed to change password for {}: {}", user.user_name, e);
            HttpResponse::InternalServerError().json(ChangePasswordResponse {
                success: false,
                message: "Failed to change password".into(),
                field_errors: Vec::new(),
            })
        }
    }
}
