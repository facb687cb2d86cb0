use anyhow::Context;
use chrono::{Duration, NaiveTime, Utc};
use consult_market_api::{
    db::{create_pool, orm_from_pool, run_migrations},
    services::auth_service::hash_password,
    validate::slugify,
};
use sqlx::PgPool;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let admin_email = std::env::var("SEED_ADMIN_EMAIL").context("SEED_ADMIN_EMAIL is not set")?;
    let admin_password =
        std::env::var("SEED_ADMIN_PASSWORD").context("SEED_ADMIN_PASSWORD is not set")?;

    let pool = create_pool(&database_url).await?;
    run_migrations(&orm_from_pool(&pool)).await?;

    let admin_id = ensure_admin(&pool, &admin_email, &admin_password).await?;
    let category_id = ensure_category(&pool, "Tax & Finance").await?;
    let consultant_id = ensure_consultant(&pool, "Asha Rao", "asha@example.com").await?;
    seed_slots(&pool, consultant_id).await?;
    seed_services(&pool, category_id, consultant_id).await?;
    seed_blog(&pool).await?;

    println!("Seed completed. Superadmin ID: {admin_id}, Consultant ID: {consultant_id}");
    Ok(())
}

fn hash(password: &str) -> anyhow::Result<String> {
    hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))
}

async fn ensure_admin(pool: &PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO admins (id, email, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET password_hash = EXCLUDED.password_hash
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email.trim().to_lowercase())
    .bind(hash(password)?)
    .fetch_one(pool)
    .await?;

    println!("Ensured superadmin {email}");
    Ok(id)
}

async fn ensure_category(pool: &PgPool, name: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name, slug, description)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(slugify(name))
    .bind("Returns, planning and compliance")
    .fetch_one(pool)
    .await?;

    for sub in ["Income Tax", "GST"] {
        sqlx::query(
            r#"
            INSERT INTO subcategories (id, category_id, name)
            SELECT $1, $2, $3
            WHERE NOT EXISTS (
                SELECT 1 FROM subcategories WHERE category_id = $2 AND name = $3
            )
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(id)
        .bind(sub)
        .execute(pool)
        .await?;
    }

    println!("Ensured category {name}");
    Ok(id)
}

async fn ensure_consultant(pool: &PgPool, name: &str, email: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO consultants (id, name, email, specialization, bio, is_online, password_hash)
        VALUES ($1, $2, $3, $4, $5, TRUE, $6)
        ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind("Tax")
    .bind("Chartered accountant, ten years of individual tax practice.")
    .bind(hash("consultant123")?)
    .fetch_one(pool)
    .await?;

    println!("Ensured consultant {email}");
    Ok(id)
}

async fn seed_slots(pool: &PgPool, consultant_id: Uuid) -> anyhow::Result<()> {
    let tomorrow = Utc::now().date_naive() + Duration::days(1);
    for hour in [10u32, 11, 14] {
        let start = NaiveTime::from_hms_opt(hour, 0, 0).context("invalid slot hour")?;
        let end = NaiveTime::from_hms_opt(hour, 45, 0).context("invalid slot hour")?;
        sqlx::query(
            r#"
            INSERT INTO consultant_availability (id, consultant_id, date, start_time, end_time)
            SELECT $1, $2, $3, $4, $5
            WHERE NOT EXISTS (
                SELECT 1 FROM consultant_availability
                WHERE consultant_id = $2 AND date = $3 AND start_time = $4
            )
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(consultant_id)
        .bind(tomorrow)
        .bind(start)
        .bind(end)
        .execute(pool)
        .await?;
    }

    println!("Seeded slots for {tomorrow}");
    Ok(())
}

async fn seed_services(pool: &PgPool, category_id: Uuid, consultant_id: Uuid) -> anyhow::Result<()> {
    let services = [
        ("ITR Filing Consultation", "consultation", 500i64),
        ("Tax Saving Handbook", "ebook", 199),
        ("GST Basics Webinar", "webinar", 299),
    ];

    for (title, kind, price) in services {
        let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM services WHERE title = $1")
            .bind(title)
            .fetch_optional(pool)
            .await?;
        let service_id = match existing {
            Some((id,)) => id,
            None => {
                let (id,): (Uuid,) = sqlx::query_as(
                    r#"
                    INSERT INTO services (id, category_id, title, kind, price)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(category_id)
                .bind(title)
                .bind(kind)
                .bind(price)
                .fetch_one(pool)
                .await?;
                id
            }
        };

        sqlx::query(
            r#"
            INSERT INTO service_consultants (service_id, consultant_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(service_id)
        .bind(consultant_id)
        .execute(pool)
        .await?;
    }

    println!("Seeded services");
    Ok(())
}

async fn seed_blog(pool: &PgPool) -> anyhow::Result<()> {
    let title = "Five deductions people forget";
    sqlx::query(
        r#"
        INSERT INTO blogs (id, title, slug, summary, content, author, published)
        VALUES ($1, $2, $3, $4, $5, $6, TRUE)
        ON CONFLICT (slug) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(title)
    .bind(slugify(title))
    .bind("A short checklist before filing.")
    .bind("Health insurance premiums, education loan interest, donations, rent and NPS.")
    .bind("Asha Rao")
    .execute(pool)
    .await?;

    println!("Seeded blog");
    Ok(())
}
