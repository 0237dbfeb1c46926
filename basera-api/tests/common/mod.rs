#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use basera_api::middleware::auth::issue_token;
use basera_api::password::hash_password;
use basera_api::state::{AppState, AuthConfig};
use basera_core::analytics::{
    period_start, trend_buckets, DashboardAnalytics, DashboardOverview, DashboardTrends,
    OwnerAnalytics, OwnerOverview, OwnerTrends, TrendPeriod, TrendPoint,
};
use basera_core::booking::{Booking, BookingWithContext, PaymentReviewEffect};
use basera_core::listing::{
    BookingStats, EnrolledUser, Faculty, FacultyUpdate, Listing, ListingDetail, ListingOverview,
    ListingUpdate, OwnerInfo,
};
use basera_core::media::MockMediaStorage;
use basera_core::repository::{
    AnalyticsRepository, BookingFilter, BookingRepository, FacultyRepository, ListingRepository,
    SettingsRepository, UserRepository,
};
use basera_core::settings::{AdminSettings, SettingsUpdate, SETTINGS_ROW_ID};
use basera_core::user::{ProfileUpdate, User};
use basera_shared::{BookingStatus, ListingType, UserRole};
use basera_store::ConsoleMailer;

type RepoError = Box<dyn std::error::Error + Send + Sync>;

pub const TEST_PASSWORD: &str = "password-123";

// ============================================================================
// In-memory tables
// ============================================================================

#[derive(Default)]
pub struct MemoryDb {
    pub users: Mutex<Vec<User>>,
    pub listings: Mutex<Vec<Listing>>,
    pub faculty: Mutex<Vec<Faculty>>,
    pub bookings: Mutex<Vec<Booking>>,
    pub settings: Mutex<Option<AdminSettings>>,
}

impl MemoryDb {
    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    pub fn booking(&self, id: Uuid) -> Option<Booking> {
        self.bookings
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }

    fn listing_owner(&self, listing_id: Uuid) -> Option<Uuid> {
        self.listings
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == listing_id)
            .map(|l| l.owner_id)
    }
}

// ============================================================================
// Repository fakes
// ============================================================================

pub struct MemoryUserRepo(pub Arc<MemoryDb>);

#[async_trait]
impl UserRepository for MemoryUserRepo {
    async fn create(&self, user: &User) -> Result<(), RepoError> {
        self.0.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self.0.user_by_email(email))
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.0.users.lock().unwrap().clone())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, RepoError> {
        let mut users = self.0.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(v) = &update.first_name {
            user.first_name = Some(v.clone());
        }
        if let Some(v) = &update.last_name {
            user.last_name = Some(v.clone());
        }
        if let Some(v) = &update.phone_number {
            user.phone_number = Some(v.clone());
        }
        if let Some(v) = &update.address {
            user.address = Some(v.clone());
        }
        if let Some(v) = &update.city {
            user.city = Some(v.clone());
        }
        if let Some(v) = &update.state {
            user.state = Some(v.clone());
        }
        if let Some(v) = &update.pincode {
            user.pincode = Some(v.clone());
        }
        if let Some(v) = &update.profile_image {
            user.profile_image = Some(v.clone());
        }
        user.updated_at = Some(Utc::now());
        Ok(Some(user.clone()))
    }

    async fn set_otp(
        &self,
        id: Uuid,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let mut users = self.0.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.otp_code = Some(code.to_string());
            user.otp_expires_at = Some(expires_at);
        }
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let mut users = self.0.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.is_active = true;
        user.is_verified_email = true;
        user.otp_code = None;
        user.otp_expires_at = None;
        user.updated_at = Some(Utc::now());
        Ok(Some(user.clone()))
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<User>, RepoError> {
        let mut users = self.0.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.password_hash = password_hash.to_string();
        user.otp_code = None;
        user.otp_expires_at = None;
        user.updated_at = Some(Utc::now());
        Ok(Some(user.clone()))
    }

    async fn update_last_login(&self, id: Uuid) -> Result<(), RepoError> {
        let mut users = self.0.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }

    async fn set_lister_approval(
        &self,
        id: Uuid,
        approved: bool,
    ) -> Result<Option<User>, RepoError> {
        let mut users = self.0.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.is_approved_lister = approved;
        user.updated_at = Some(Utc::now());
        Ok(Some(user.clone()))
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> Result<Option<User>, RepoError> {
        let mut users = self.0.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.role = role;
        user.updated_at = Some(Utc::now());
        Ok(Some(user.clone()))
    }
}

pub struct MemoryListingRepo(pub Arc<MemoryDb>);

#[async_trait]
impl ListingRepository for MemoryListingRepo {
    async fn create(&self, listing: &Listing) -> Result<(), RepoError> {
        self.0.listings.lock().unwrap().push(listing.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Listing>, RepoError> {
        let Some(mut listing) = self
            .0
            .listings
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == id)
            .cloned()
        else {
            return Ok(None);
        };
        listing.faculty = self
            .0
            .faculty
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.listing_id == id)
            .cloned()
            .collect();
        Ok(Some(listing))
    }

    async fn list(
        &self,
        listing_type: Option<ListingType>,
        owner_id: Option<Uuid>,
    ) -> Result<Vec<Listing>, RepoError> {
        Ok(self
            .0
            .listings
            .lock()
            .unwrap()
            .iter()
            .filter(|l| listing_type.map_or(true, |t| l.listing_type == t))
            .filter(|l| owner_id.map_or(true, |o| l.owner_id == o))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: Uuid,
        update: &ListingUpdate,
    ) -> Result<Option<Listing>, RepoError> {
        let mut listings = self.0.listings.lock().unwrap();
        let Some(listing) = listings.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        if let Some(v) = &update.name {
            listing.name = v.clone();
        }
        if let Some(v) = &update.description {
            listing.description = Some(v.clone());
        }
        if let Some(v) = update.price_minor {
            listing.price_minor = v;
        }
        if let Some(v) = &update.location {
            listing.location = Some(v.clone());
        }
        if let Some(v) = &update.features {
            listing.features = v.clone();
        }
        if let Some(v) = &update.image_url {
            listing.image_url = Some(v.clone());
        }
        listing.updated_at = Some(Utc::now());
        Ok(Some(listing.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut listings = self.0.listings.lock().unwrap();
        let before = listings.len();
        listings.retain(|l| l.id != id);
        let deleted = listings.len() < before;
        if deleted {
            // ON DELETE CASCADE semantics
            self.0.faculty.lock().unwrap().retain(|f| f.listing_id != id);
            self.0
                .bookings
                .lock()
                .unwrap()
                .retain(|b| b.listing_id != id);
        }
        Ok(deleted)
    }

    async fn set_image(&self, id: Uuid, image_url: &str) -> Result<Option<Listing>, RepoError> {
        self.update(
            id,
            &ListingUpdate {
                image_url: Some(image_url.to_string()),
                ..ListingUpdate::default()
            },
        )
        .await
    }

    async fn admin_overview(&self) -> Result<Vec<ListingOverview>, RepoError> {
        let listings = self.0.listings.lock().unwrap().clone();
        let users = self.0.users.lock().unwrap().clone();
        let bookings = self.0.bookings.lock().unwrap().clone();

        Ok(listings
            .into_iter()
            .filter_map(|l| {
                let owner = users.iter().find(|u| u.id == l.owner_id)?;
                let on_listing: Vec<&Booking> =
                    bookings.iter().filter(|b| b.listing_id == l.id).collect();
                Some(ListingOverview {
                    id: l.id,
                    name: l.name,
                    listing_type: l.listing_type,
                    price_minor: l.price_minor,
                    location: l.location,
                    created_at: l.created_at,
                    owner_email: owner.email.clone(),
                    owner_name: owner.display_name(),
                    total_bookings: on_listing.len() as i64,
                    pending_bookings: on_listing
                        .iter()
                        .filter(|b| b.status == BookingStatus::Pending)
                        .count() as i64,
                    accepted_revenue_minor: on_listing
                        .iter()
                        .filter(|b| b.status == BookingStatus::Accepted)
                        .map(|b| b.amount_minor)
                        .sum(),
                })
            })
            .collect())
    }

    async fn admin_detail(&self, id: Uuid) -> Result<Option<ListingDetail>, RepoError> {
        let Some(listing) = self.get(id).await? else {
            return Ok(None);
        };
        let users = self.0.users.lock().unwrap().clone();
        let Some(owner) = users.iter().find(|u| u.id == listing.owner_id) else {
            return Ok(None);
        };
        let bookings = self.0.bookings.lock().unwrap().clone();

        let mut stats = BookingStats::default();
        let enrolled_users: Vec<EnrolledUser> = bookings
            .iter()
            .filter(|b| b.listing_id == id)
            .filter_map(|b| {
                let user = users.iter().find(|u| u.id == b.user_id)?;
                stats.total_bookings += 1;
                match b.status {
                    BookingStatus::Pending => stats.pending_bookings += 1,
                    BookingStatus::Accepted => {
                        stats.accepted_bookings += 1;
                        stats.total_revenue_minor += b.amount_minor;
                    }
                    BookingStatus::Rejected => stats.rejected_bookings += 1,
                    _ => {}
                }
                Some(EnrolledUser {
                    id: user.id,
                    email: user.email.clone(),
                    first_name: user.first_name.clone(),
                    last_name: user.last_name.clone(),
                    phone_number: user.phone_number.clone(),
                    booking_id: b.id,
                    booking_status: b.status,
                    booking_amount_minor: b.amount_minor,
                    enrolled_at: b.created_at,
                    payment_reference: b.payment_reference.clone(),
                })
            })
            .collect();

        Ok(Some(ListingDetail {
            owner: OwnerInfo {
                id: owner.id,
                email: owner.email.clone(),
                first_name: owner.first_name.clone(),
                last_name: owner.last_name.clone(),
                phone_number: owner.phone_number.clone(),
                role: owner.role,
                is_approved_lister: owner.is_approved_lister,
            },
            listing,
            stats,
            enrolled_users,
        }))
    }
}

pub struct MemoryFacultyRepo(pub Arc<MemoryDb>);

#[async_trait]
impl FacultyRepository for MemoryFacultyRepo {
    async fn create(&self, faculty: &Faculty) -> Result<(), RepoError> {
        self.0.faculty.lock().unwrap().push(faculty.clone());
        Ok(())
    }

    async fn create_many(&self, faculty: &[Faculty]) -> Result<(), RepoError> {
        self.0.faculty.lock().unwrap().extend_from_slice(faculty);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Faculty>, RepoError> {
        Ok(self
            .0
            .faculty
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id == id)
            .cloned())
    }

    async fn list(&self, listing_id: Option<Uuid>) -> Result<Vec<Faculty>, RepoError> {
        Ok(self
            .0
            .faculty
            .lock()
            .unwrap()
            .iter()
            .filter(|f| listing_id.map_or(true, |l| f.listing_id == l))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: Uuid,
        update: &FacultyUpdate,
    ) -> Result<Option<Faculty>, RepoError> {
        let mut faculty = self.0.faculty.lock().unwrap();
        let Some(member) = faculty.iter_mut().find(|f| f.id == id) else {
            return Ok(None);
        };
        if let Some(v) = &update.name {
            member.name = v.clone();
        }
        if let Some(v) = &update.subject {
            member.subject = Some(v.clone());
        }
        if let Some(v) = &update.image_url {
            member.image_url = Some(v.clone());
        }
        Ok(Some(member.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut faculty = self.0.faculty.lock().unwrap();
        let before = faculty.len();
        faculty.retain(|f| f.id != id);
        Ok(faculty.len() < before)
    }
}

pub struct MemoryBookingRepo(pub Arc<MemoryDb>);

impl MemoryBookingRepo {
    fn with_context(&self, booking: Booking) -> Option<BookingWithContext> {
        let users = self.0.users.lock().unwrap();
        let listings = self.0.listings.lock().unwrap();
        let user = users.iter().find(|u| u.id == booking.user_id)?;
        let listing = listings.iter().find(|l| l.id == booking.listing_id)?;
        Some(BookingWithContext {
            user_email: user.email.clone(),
            user_name: user.display_name(),
            user_phone: user.phone_number.clone(),
            listing_name: listing.name.clone(),
            listing_type: listing.listing_type,
            booking,
        })
    }
}

#[async_trait]
impl BookingRepository for MemoryBookingRepo {
    async fn create(&self, booking: &Booking) -> Result<(), RepoError> {
        self.0.bookings.lock().unwrap().push(booking.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Booking>, RepoError> {
        Ok(self.0.booking(id))
    }

    async fn list(&self, filter: BookingFilter) -> Result<Vec<BookingWithContext>, RepoError> {
        let bookings = self.0.bookings.lock().unwrap().clone();
        Ok(bookings
            .into_iter()
            .filter(|b| filter.user_id.map_or(true, |u| b.user_id == u))
            .filter(|b| filter.listing_id.map_or(true, |l| b.listing_id == l))
            .filter(|b| {
                filter
                    .listing_owner_id
                    .map_or(true, |o| self.0.listing_owner(b.listing_id) == Some(o))
            })
            .filter_map(|b| self.with_context(b))
            .collect())
    }

    async fn update_proof(
        &self,
        id: Uuid,
        payment_reference: &str,
        payment_screenshot: &str,
    ) -> Result<Option<Booking>, RepoError> {
        let mut bookings = self.0.bookings.lock().unwrap();
        let Some(booking) = bookings.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        booking.payment_reference = Some(payment_reference.to_string());
        booking.payment_screenshot = Some(payment_screenshot.to_string());
        booking.updated_at = Some(Utc::now());
        Ok(Some(booking.clone()))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Option<Booking>, RepoError> {
        let mut bookings = self.0.bookings.lock().unwrap();
        let Some(booking) = bookings.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        booking.status = status;
        booking.updated_at = Some(Utc::now());
        Ok(Some(booking.clone()))
    }

    async fn apply_payment_review(
        &self,
        id: Uuid,
        effect: &PaymentReviewEffect,
    ) -> Result<Option<Booking>, RepoError> {
        let mut bookings = self.0.bookings.lock().unwrap();
        let Some(booking) = bookings.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        booking.apply_payment_review(effect);
        Ok(Some(booking.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut bookings = self.0.bookings.lock().unwrap();
        let before = bookings.len();
        bookings.retain(|b| b.id != id);
        Ok(bookings.len() < before)
    }
}

pub struct MemorySettingsRepo(pub Arc<MemoryDb>);

#[async_trait]
impl SettingsRepository for MemorySettingsRepo {
    async fn get(&self) -> Result<Option<AdminSettings>, RepoError> {
        Ok(self.0.settings.lock().unwrap().clone())
    }

    async fn upsert(
        &self,
        update: &SettingsUpdate,
        admin_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<AdminSettings, RepoError> {
        let mut slot = self.0.settings.lock().unwrap();
        let mut settings = slot.clone().unwrap_or(AdminSettings {
            id: SETTINGS_ROW_ID,
            payment_qr_code: None,
            payment_upi_id: None,
            updated_by: None,
            updated_at: None,
        });
        if let Some(v) = &update.payment_qr_code {
            settings.payment_qr_code = Some(v.clone());
        }
        if let Some(v) = &update.payment_upi_id {
            settings.payment_upi_id = Some(v.clone());
        }
        settings.updated_by = Some(admin_id);
        settings.updated_at = Some(now);
        *slot = Some(settings.clone());
        Ok(settings)
    }
}

pub struct MemoryAnalyticsRepo(pub Arc<MemoryDb>);

impl MemoryAnalyticsRepo {
    fn owner_listing_ids(&self, owner_id: Uuid) -> Vec<Uuid> {
        let listings = self.0.listings.lock().unwrap();
        listings
            .iter()
            .filter(|l| l.owner_id == owner_id)
            .map(|l| l.id)
            .collect()
    }
}

#[async_trait]
impl AnalyticsRepository for MemoryAnalyticsRepo {
    async fn admin_dashboard(
        &self,
        period: TrendPeriod,
        now: DateTime<Utc>,
    ) -> Result<DashboardAnalytics, RepoError> {
        let users = self.0.users.lock().unwrap().clone();
        let listings = self.0.listings.lock().unwrap().clone();
        let bookings = self.0.bookings.lock().unwrap().clone();
        let since = period_start(period, now);

        let mut active: Vec<Uuid> = bookings.iter().map(|b| b.user_id).collect();
        active.sort();
        active.dedup();

        let mut bookings_by_status = BTreeMap::new();
        for b in &bookings {
            *bookings_by_status.entry(b.status.to_string()).or_insert(0) += 1;
        }
        let mut listings_by_type = BTreeMap::new();
        for l in &listings {
            *listings_by_type
                .entry(l.listing_type.to_string())
                .or_insert(0) += 1;
        }

        let buckets = trend_buckets(period, now);
        let trend = |f: &dyn Fn(DateTime<Utc>, DateTime<Utc>) -> i64| -> Vec<TrendPoint> {
            buckets
                .iter()
                .map(|bucket| TrendPoint {
                    label: bucket.label.clone(),
                    value: f(bucket.start, bucket.end),
                })
                .collect()
        };

        Ok(DashboardAnalytics {
            overview: DashboardOverview {
                total_users: users.len() as i64,
                total_listings: listings.len() as i64,
                total_bookings: bookings.len() as i64,
                active_users: active.len() as i64,
                period_bookings: bookings.iter().filter(|b| b.created_at >= since).count() as i64,
                total_revenue_minor: bookings
                    .iter()
                    .filter(|b| b.status == BookingStatus::Accepted)
                    .map(|b| b.amount_minor)
                    .sum(),
                period_revenue_minor: bookings
                    .iter()
                    .filter(|b| b.status == BookingStatus::Accepted && b.created_at >= since)
                    .map(|b| b.amount_minor)
                    .sum(),
                pending_listers: users
                    .iter()
                    .filter(|u| u.role.is_lister() && !u.is_approved_lister)
                    .count() as i64,
                pending_bookings: bookings
                    .iter()
                    .filter(|b| b.status == BookingStatus::Pending)
                    .count() as i64,
            },
            bookings_by_status,
            listings_by_type,
            trends: DashboardTrends {
                bookings: trend(&|start, end| {
                    bookings
                        .iter()
                        .filter(|b| b.created_at >= start && b.created_at < end)
                        .count() as i64
                }),
                users: trend(&|start, end| {
                    users
                        .iter()
                        .filter(|u| u.date_joined >= start && u.date_joined < end)
                        .count() as i64
                }),
                revenue: trend(&|start, end| {
                    bookings
                        .iter()
                        .filter(|b| {
                            b.status == BookingStatus::Accepted
                                && b.created_at >= start
                                && b.created_at < end
                        })
                        .map(|b| b.amount_minor)
                        .sum()
                }),
            },
            period,
        })
    }

    async fn owner_dashboard(
        &self,
        owner_id: Uuid,
        period: TrendPeriod,
        now: DateTime<Utc>,
    ) -> Result<OwnerAnalytics, RepoError> {
        let listing_ids = self.owner_listing_ids(owner_id);
        let bookings: Vec<Booking> = self
            .0
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| listing_ids.contains(&b.listing_id))
            .cloned()
            .collect();
        let since = period_start(period, now);

        let mut customers: Vec<Uuid> = bookings.iter().map(|b| b.user_id).collect();
        customers.sort();
        customers.dedup();

        let mut bookings_by_status = BTreeMap::new();
        for b in &bookings {
            *bookings_by_status.entry(b.status.to_string()).or_insert(0) += 1;
        }

        let total_revenue_minor: i64 = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Accepted)
            .map(|b| b.amount_minor)
            .sum();
        let total_bookings = bookings.len() as i64;

        let buckets = trend_buckets(period, now);
        Ok(OwnerAnalytics {
            overview: OwnerOverview {
                total_listings: listing_ids.len() as i64,
                total_bookings,
                period_bookings: bookings.iter().filter(|b| b.created_at >= since).count() as i64,
                unique_customers: customers.len() as i64,
                total_revenue_minor,
                period_revenue_minor: bookings
                    .iter()
                    .filter(|b| b.status == BookingStatus::Accepted && b.created_at >= since)
                    .map(|b| b.amount_minor)
                    .sum(),
                pending_bookings: bookings
                    .iter()
                    .filter(|b| b.status == BookingStatus::Pending)
                    .count() as i64,
                avg_booking_value_minor: if total_bookings > 0 {
                    total_revenue_minor / total_bookings
                } else {
                    0
                },
            },
            bookings_by_status,
            trends: OwnerTrends {
                bookings: buckets
                    .iter()
                    .map(|bucket| TrendPoint {
                        label: bucket.label.clone(),
                        value: bookings
                            .iter()
                            .filter(|b| b.created_at >= bucket.start && b.created_at < bucket.end)
                            .count() as i64,
                    })
                    .collect(),
                revenue: buckets
                    .iter()
                    .map(|bucket| TrendPoint {
                        label: bucket.label.clone(),
                        value: bookings
                            .iter()
                            .filter(|b| {
                                b.status == BookingStatus::Accepted
                                    && b.created_at >= bucket.start
                                    && b.created_at < bucket.end
                            })
                            .map(|b| b.amount_minor)
                            .sum(),
                    })
                    .collect(),
            },
            period,
        })
    }
}

// ============================================================================
// Test harness
// ============================================================================

pub fn test_state() -> (AppState, Arc<MemoryDb>) {
    let db = Arc::new(MemoryDb::default());
    let state = AppState {
        users: Arc::new(MemoryUserRepo(db.clone())),
        listings: Arc::new(MemoryListingRepo(db.clone())),
        faculty: Arc::new(MemoryFacultyRepo(db.clone())),
        bookings: Arc::new(MemoryBookingRepo(db.clone())),
        settings: Arc::new(MemorySettingsRepo(db.clone())),
        analytics: Arc::new(MemoryAnalyticsRepo(db.clone())),
        media: Arc::new(MockMediaStorage),
        mailer: Arc::new(ConsoleMailer),
        auth: AuthConfig {
            secret: "integration-test-secret".to_string(),
            expiration: 3600,
            otp_ttl_minutes: 15,
        },
        media_folder: "test".to_string(),
    };
    (state, db)
}

/// Seed an active, verified account and return it with a valid token.
pub fn seed_user(
    state: &AppState,
    db: &Arc<MemoryDb>,
    email: &str,
    role: UserRole,
    approved: bool,
) -> (User, String) {
    let mut user = User::new(
        email.to_string(),
        hash_password(TEST_PASSWORD).unwrap(),
        role,
    );
    user.is_active = true;
    user.is_verified_email = true;
    user.is_approved_lister = approved;
    db.users.lock().unwrap().push(user.clone());
    let token = issue_token(&user, &state.auth).unwrap();
    (user, token)
}

pub fn seed_listing(db: &Arc<MemoryDb>, owner_id: Uuid, price_minor: i64) -> Listing {
    let listing = Listing::new(
        owner_id,
        ListingType::Coaching,
        "Lakshya IIT Academy".to_string(),
        Some("Two-year JEE program".to_string()),
        price_minor,
        Some("Kota".to_string()),
        vec!["ac".to_string(), "library".to_string()],
    );
    db.listings.lock().unwrap().push(listing.clone());
    listing
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}
