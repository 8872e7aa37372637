use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use time::{
    format_description::FormatItem, macros::format_description, Date, Duration, OffsetDateTime,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    diary::{
        dto::{AddFoodRequest, AddFoodResponse, MacrosResponse, RangeQuery, UpdateEntryRequest},
        entry::{DailyEntry, EntryError, MealType, MAX_QUANTITY},
    },
    errors::{AppError, AppResult},
    nutrition::foods::FoodFact,
    state::AppState,
};

const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const MAX_RANGE_DAYS: i64 = 366;
const DEFAULT_RANGE_DAYS: i64 = 7;
/// Per-nutrient ceiling for caller-supplied foods.
const MAX_NUTRIENT_VALUE: f64 = 100_000.0;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/diary", get(list_entries))
        .route("/diary/:date", get(get_entry).patch(update_entry))
        .route("/diary/:date/macros", get(get_macros))
        .route("/diary/:date/meals/:meal", post(add_food))
        .route(
            "/diary/:date/meals/:meal/items/:item_id",
            delete(remove_food),
        )
}

fn parse_date(raw: &str) -> AppResult<Date> {
    Date::parse(raw.trim(), ISO_DATE)
        .map_err(|_| AppError::bad_request(format!("Invalid date {raw:?}, expected YYYY-MM-DD")))
}

fn parse_meal(raw: &str) -> AppResult<MealType> {
    raw.parse()
        .map_err(|_| AppError::bad_request(format!("Unknown meal type {raw:?}")))
}

/// Existing entry for the day, or a fresh unsaved one.
async fn load_or_new(state: &AppState, user_id: Uuid, date: Date) -> AppResult<DailyEntry> {
    Ok(state
        .store
        .find_daily_entry(user_id, date)
        .await?
        .unwrap_or_else(|| DailyEntry::new(user_id, date)))
}

/// Entry rule violations are the caller's fault; anything else is internal.
fn edit_error(e: anyhow::Error) -> AppError {
    match e.downcast_ref::<EntryError>() {
        Some(missing @ EntryError::ItemNotFound) => AppError::not_found(missing.to_string()),
        Some(rule) => AppError::bad_request(rule.to_string()),
        None => AppError::Internal(e),
    }
}

#[instrument(skip(state))]
pub async fn get_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> AppResult<Json<DailyEntry>> {
    let date = parse_date(&date)?;
    if let Some(entry) = state.store.find_daily_entry(user_id, date).await? {
        return Ok(Json(entry));
    }
    let entry = state
        .store
        .modify_daily_entry(
            user_id,
            date,
            Box::new(|_: &mut DailyEntry| -> anyhow::Result<()> { Ok(()) }),
        )
        .await?;
    debug!(user_id = %user_id, %date, "daily entry created");
    Ok(Json(entry))
}

#[instrument(skip(state))]
pub async fn list_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<RangeQuery>,
) -> AppResult<Json<Vec<DailyEntry>>> {
    let to = match q.to.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => OffsetDateTime::now_utc().date(),
    };
    let from = match q.from.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => to
            .checked_sub(Duration::days(DEFAULT_RANGE_DAYS - 1))
            .unwrap_or(Date::MIN),
    };
    if from > to {
        return Err(AppError::bad_request("from must not be after to"));
    }
    if (to - from).whole_days() >= MAX_RANGE_DAYS {
        return Err(AppError::bad_request(format!(
            "Date range may span at most {MAX_RANGE_DAYS} days"
        )));
    }

    let entries = state.store.list_daily_entries(user_id, from, to).await?;
    Ok(Json(entries))
}

#[instrument(skip(state, payload))]
pub async fn update_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
    Json(payload): Json<UpdateEntryRequest>,
) -> AppResult<Json<DailyEntry>> {
    let date = parse_date(&date)?;
    let UpdateEntryRequest {
        water_intake,
        notes,
    } = payload;
    let entry = state
        .store
        .modify_daily_entry(
            user_id,
            date,
            Box::new(move |entry: &mut DailyEntry| -> anyhow::Result<()> {
                entry.update_details(water_intake, notes)?;
                Ok(())
            }),
        )
        .await
        .map_err(edit_error)?;
    Ok(Json(entry))
}

#[instrument(skip(state, payload))]
pub async fn add_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((date, meal)): Path<(String, String)>,
    Json(payload): Json<AddFoodRequest>,
) -> AppResult<(StatusCode, Json<AddFoodResponse>)> {
    let date = parse_date(&date)?;
    let meal = parse_meal(&meal)?;
    let quantity = payload.quantity.unwrap_or(1.0);
    if !quantity.is_finite() || quantity <= 0.0 || quantity > MAX_QUANTITY {
        return Err(AppError::bad_request(
            EntryError::InvalidQuantity(quantity).to_string(),
        ));
    }

    let food = match (payload.food, payload.query.as_deref().map(str::trim)) {
        (Some(food), _) => validate_food(food)?,
        (None, Some(query)) if !query.is_empty() => state.foods.lookup(query).await,
        _ => return Err(AppError::bad_request("No food query provided")),
    };

    let mut added = None;
    let entry = state
        .store
        .modify_daily_entry(
            user_id,
            date,
            Box::new(|entry: &mut DailyEntry| -> anyhow::Result<()> {
                added = Some(entry.add_food_to_meal(meal, &food, quantity)?);
                Ok(())
            }),
        )
        .await
        .map_err(edit_error)?;
    let item = added
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("food item not recorded")))?;

    info!(
        user_id = %user_id,
        %date,
        %meal,
        food = %item.food_name,
        quantity,
        approximate = food.is_approximate(),
        items = entry.item_count(),
        "food added"
    );
    Ok((StatusCode::CREATED, Json(AddFoodResponse { item, entry })))
}

#[instrument(skip(state))]
pub async fn remove_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((date, meal, item_id)): Path<(String, String, Uuid)>,
) -> AppResult<StatusCode> {
    let date = parse_date(&date)?;
    let meal = parse_meal(&meal)?;

    state
        .store
        .modify_daily_entry(
            user_id,
            date,
            Box::new(move |entry: &mut DailyEntry| -> anyhow::Result<()> {
                if !entry.remove_food_from_meal(meal, item_id) {
                    return Err(EntryError::ItemNotFound.into());
                }
                Ok(())
            }),
        )
        .await
        .map_err(|e| {
            warn!(user_id = %user_id, %date, %meal, %item_id, error = %e, "food removal failed");
            edit_error(e)
        })?;
    info!(user_id = %user_id, %date, %meal, %item_id, "food removed");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_macros(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> AppResult<Json<MacrosResponse>> {
    let date = parse_date(&date)?;
    let entry = load_or_new(&state, user_id, date).await?;
    Ok(Json(MacrosResponse::from(&entry)))
}

/// Caller-supplied facts must be finite, non-negative and bounded.
fn validate_food(mut food: FoodFact) -> AppResult<FoodFact> {
    let values = [
        food.calories,
        food.protein_g,
        food.carbs_g,
        food.fat_g,
        food.fiber_g,
    ];
    if values
        .iter()
        .any(|v| !v.is_finite() || *v < 0.0 || *v > MAX_NUTRIENT_VALUE)
    {
        return Err(AppError::bad_request(format!(
            "Nutrient values must be non-negative numbers up to {MAX_NUTRIENT_VALUE}"
        )));
    }
    food.food_name = food.food_name.trim().to_string();
    if food.food_name.is_empty() {
        return Err(AppError::bad_request("food_name is required"));
    }
    Ok(food)
}

#[cfg(test)]
mod tests {
    use crate::app::build_app;
    use crate::state::AppState;
    use crate::test_support::{register, send};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    fn close(v: &serde_json::Value, expected: f64) -> bool {
        v.as_f64().is_some_and(|x| (x - expected).abs() < 1e-9)
    }

    #[tokio::test]
    async fn add_and_remove_apple_round_trips_totals() {
        let app = build_app(AppState::fake());
        let auth = register(&app, "quinn").await;
        let token = Some(auth.access_token.as_str());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/diary/2024-05-01/meals/breakfast",
            token,
            Some(json!({"query": "apple", "quantity": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(close(&body["entry"]["totals"]["calories"], 190.0));
        assert!(close(&body["entry"]["totals"]["carbs_g"], 50.2));
        let item_id = body["item"]["id"].as_str().unwrap_or_default().to_string();

        let uri = format!("/api/v1/diary/2024-05-01/meals/breakfast/items/{item_id}");
        let (status, _) = send(&app, Method::DELETE, &uri, token, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(&app, Method::GET, "/api/v1/diary/2024-05-01", token, None).await;
        assert!(close(&body["totals"]["calories"], 0.0));
        assert_eq!(body["meals"]["breakfast"].as_array().map(Vec::len), Some(0));

        let (status, body) = send(&app, Method::DELETE, &uri, token, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Food item not found");
    }

    #[tokio::test]
    async fn explicit_food_and_macros() {
        let app = build_app(AppState::fake());
        let auth = register(&app, "rosa").await;
        let token = Some(auth.access_token.as_str());

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/diary/2024-05-02/meals/snack",
            token,
            Some(json!({"food": {
                "food_name": "Protein bar",
                "calories": 200.0,
                "protein_g": 20.0,
                "carbs_g": 20.0,
                "fat_g": 4.0,
                "fiber_g": 1.0
            }})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/diary/2024-05-02/macros",
            token,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let p = &body["percentages"];
        // 80 / 80 / 36 kcal
        assert_eq!(p["protein"], 41);
        assert_eq!(p["carbs"], 41);
        assert_eq!(p["fat"], 18);
        assert_eq!(body["date"], "2024-05-02");
    }

    #[tokio::test]
    async fn rejects_bad_inputs() {
        let app = build_app(AppState::fake());
        let auth = register(&app, "sam").await;
        let token = Some(auth.access_token.as_str());

        let cases = [
            ("/api/v1/diary/2024-13-01/meals/lunch", json!({"query": "apple"})),
            ("/api/v1/diary/2024-05-01/meals/brunch", json!({"query": "apple"})),
            ("/api/v1/diary/2024-05-01/meals/lunch", json!({"query": "apple", "quantity": 0})),
            ("/api/v1/diary/2024-05-01/meals/lunch", json!({"query": "  "})),
            (
                "/api/v1/diary/2024-05-01/meals/lunch",
                json!({"food": {"food_name": "x", "calories": -1.0, "protein_g": 0.0,
                       "carbs_g": 0.0, "fat_g": 0.0, "fiber_g": 0.0}}),
            ),
        ];
        for (uri, body) in cases {
            let (status, _) = send(&app, Method::POST, uri, token, Some(body.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} {body}");
        }
    }

    #[tokio::test]
    async fn oversized_quantity_or_facts_leave_day_readable() {
        let app = build_app(AppState::fake());
        let auth = register(&app, "wren").await;
        let token = Some(auth.access_token.as_str());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/diary/2024-05-06/meals/lunch",
            token,
            Some(json!({"query": "apple", "quantity": 1e308})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/diary/2024-05-06/meals/lunch",
            token,
            Some(json!({"food": {"food_name": "x", "calories": 1e308, "protein_g": 0.0,
                   "carbs_g": 0.0, "fat_g": 0.0, "fiber_g": 0.0}, "quantity": 1000})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        for uri in ["/api/v1/diary/2024-05-06", "/api/v1/diary/2024-05-06/macros"] {
            let (status, body) = send(&app, Method::GET, uri, token, None).await;
            assert_eq!(status, StatusCode::OK);
            assert!(close(&body["totals"]["calories"], 0.0));
        }
    }

    #[tokio::test]
    async fn concurrent_adds_keep_both_items() {
        let app = build_app(AppState::fake());
        let auth = register(&app, "xavi").await;
        let token = Some(auth.access_token.as_str());
        let uri = "/api/v1/diary/2024-05-07/meals/dinner";

        let ((s1, b1), (s2, b2)) = tokio::join!(
            send(&app, Method::POST, uri, token, Some(json!({"query": "salmon"}))),
            send(&app, Method::POST, uri, token, Some(json!({"query": "broccoli"}))),
        );
        assert_eq!((s1, s2), (StatusCode::CREATED, StatusCode::CREATED));

        let (_, day) = send(&app, Method::GET, "/api/v1/diary/2024-05-07", token, None).await;
        let stored: Vec<&str> = day["meals"]["dinner"]
            .as_array()
            .map(|a| a.iter().filter_map(|i| i["id"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(stored.len(), 2);
        for added in [&b1, &b2] {
            assert!(stored.contains(&added["item"]["id"].as_str().unwrap_or_default()));
        }
    }

    #[tokio::test]
    async fn patch_details_and_list_range() {
        let app = build_app(AppState::fake());
        let auth = register(&app, "tess").await;
        let token = Some(auth.access_token.as_str());

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/api/v1/diary/2024-05-03",
            token,
            Some(json!({"water_intake": 1250.0, "notes": "long run"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["water_intake_ml"], 1250.0);
        assert_eq!(body["notes"], "long run");

        let (status, _) = send(
            &app,
            Method::PATCH,
            "/api/v1/diary/2024-05-03",
            token,
            Some(json!({"water_intake": -5.0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        send(&app, Method::GET, "/api/v1/diary/2024-05-01", token, None).await;
        send(&app, Method::GET, "/api/v1/diary/2024-06-01", token, None).await;

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/diary?from=2024-05-01&to=2024-05-31",
            token,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let dates: Vec<&str> = body
            .as_array()
            .map(|a| a.iter().filter_map(|e| e["date"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(dates, vec!["2024-05-01", "2024-05-03"]);

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/v1/diary?from=2023-01-01&to=2024-05-31",
            token,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn entries_are_private_per_user() {
        let app = build_app(AppState::fake());
        let a = register(&app, "uma").await;
        let b = register(&app, "vic").await;

        send(
            &app,
            Method::POST,
            "/api/v1/diary/2024-05-04/meals/dinner",
            Some(&a.access_token),
            Some(json!({"query": "salmon"})),
        )
        .await;

        let (_, body) = send(
            &app,
            Method::GET,
            "/api/v1/diary/2024-05-04",
            Some(&b.access_token),
            None,
        )
        .await;
        assert!(close(&body["totals"]["calories"], 0.0));
    }
}
