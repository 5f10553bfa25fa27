//! Catalog statistics, projected revenue and notifications.

use chrono::{DateTime, Duration, Local};

use crate::appointment::Appointment;
use crate::constants::NOTIFICATION_WINDOW_HOURS;
use crate::service::Service;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: usize,
    pub active: usize,
    /// Featured and active
    pub featured: usize,
    /// Remaining capacity across every slot
    pub capacity: u64,
}

pub fn catalog_stats(services: &[Service]) -> CatalogStats {
    CatalogStats {
        total: services.len(),
        active: services.iter().filter(|s| s.active).count(),
        featured: services.iter().filter(|s| s.featured && s.active).count(),
        capacity: services
            .iter()
            .map(|s| s.availability.total_capacity(None))
            .sum(),
    }
}

/// Sum of booked prices still expected to be collected. Completed
/// appointments and records without id, contact name or service name do
/// not count.
pub fn projected_revenue(appointments: &[Appointment]) -> f64 {
    appointments
        .iter()
        .filter(|a| !a.is_completed())
        .filter(|a| a.has_valid_id())
        .filter(|a| !a.contact.name.trim().is_empty() && !a.service_name.trim().is_empty())
        .map(|a| if a.price.is_finite() { a.price } else { 0.0 })
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Booked within the last window
    New,
    /// Starts within the next window
    Upcoming,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub appointment: Appointment,
}

/// New bookings first, then upcoming appointments. An appointment can
/// appear in both groups.
pub fn notifications(appointments: &[Appointment], now: DateTime<Local>) -> Vec<Notification> {
    let window = Duration::hours(NOTIFICATION_WINDOW_HOURS);

    let new = appointments
        .iter()
        .filter(|a| {
            a.created_at
                .is_some_and(|created| now.signed_duration_since(created) <= window)
        })
        .map(|a| Notification {
            kind: NotificationKind::New,
            appointment: a.clone(),
        });

    let upcoming = appointments
        .iter()
        .filter(|a| {
            let until = a.time_until_start(now);
            until > Duration::zero() && until <= window
        })
        .map(|a| Notification {
            kind: NotificationKind::Upcoming,
            appointment: a.clone(),
        });

    new.chain(upcoming).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointment::Contact;
    use crate::catalog::demo_services;
    use crate::clock::{Clock, FixedClock};
    use chrono::{NaiveDate, Utc};

    fn make_test_appointment(id: &str, day: u32, time: &str) -> Appointment {
        Appointment {
            id: id.to_string(),
            service_id: "1".to_string(),
            service_name: "Masaje Relajante".to_string(),
            date: NaiveDate::from_ymd_opt(2030, 6, day).unwrap(),
            time: time.to_string(),
            price: 60.0,
            created_at: None,
            contact: Contact {
                name: "Ana".to_string(),
                phone: "912345678".to_string(),
                email: String::new(),
                user_id: None,
            },
            edited: false,
            edited_at: None,
            status: None,
        }
    }

    fn make_test_clock() -> FixedClock {
        FixedClock::at(
            NaiveDate::from_ymd_opt(2030, 6, 10)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_catalog_stats() {
        let mut services = demo_services(NaiveDate::from_ymd_opt(2030, 6, 10).unwrap());
        services[1].active = false;

        let stats = catalog_stats(&services);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.featured, 1);
        // 3 dates * 2 slots * 4 + 3 * 2 * 6 + 2 * 2 * 3
        assert_eq!(stats.capacity, 24 + 36 + 12);
    }

    #[test]
    fn test_projected_revenue_skips_incomplete_records() {
        let mut completed = make_test_appointment("2", 12, "10:00");
        completed.status = Some("completada".to_string());
        let mut anonymous = make_test_appointment("3", 12, "10:00");
        anonymous.contact.name = " ".to_string();
        let mut unnamed = make_test_appointment("4", 12, "10:00");
        unnamed.service_name = String::new();
        let mut pricey = make_test_appointment("5", 12, "10:00");
        pricey.price = 35.0;

        let appointments = vec![
            make_test_appointment("1", 12, "10:00"),
            completed,
            anonymous,
            unnamed,
            pricey,
            make_test_appointment("", 12, "10:00"),
        ];
        assert_eq!(projected_revenue(&appointments), 95.0);
        assert_eq!(projected_revenue(&[]), 0.0);
    }

    #[test]
    fn test_notifications() {
        let clock = make_test_clock();
        let now = clock.now();

        let mut fresh = make_test_appointment("1", 20, "10:00");
        fresh.created_at = Some((now - Duration::hours(2)).with_timezone(&Utc));
        let mut stale = make_test_appointment("2", 20, "10:00");
        stale.created_at = Some((now - Duration::hours(30)).with_timezone(&Utc));
        let soon = make_test_appointment("3", 11, "11:30");
        let too_far = make_test_appointment("4", 11, "12:01");
        let started = make_test_appointment("5", 10, "12:00");

        let list = notifications(&[fresh, stale, soon, too_far, started], now);
        let summary: Vec<(NotificationKind, &str)> = list
            .iter()
            .map(|n| (n.kind, n.appointment.id.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (NotificationKind::New, "1"),
                (NotificationKind::Upcoming, "3"),
            ]
        );
    }
}
