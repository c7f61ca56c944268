use time::{format_description::well_known::Rfc3339, Date, OffsetDateTime, PrimitiveDateTime};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// `YYYY-MM-DD`.
pub(crate) fn format_date(value: Date) -> String {
    format!("{:04}-{:02}-{:02}", value.year(), u8::from(value.month()), value.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Month, Time};

    #[test]
    fn format_primitive_outputs_utc_z() {
        let date = Date::from_calendar_date(2025, Month::January, 2).unwrap();
        let time = Time::from_hms(10, 20, 30).unwrap();
        let value = PrimitiveDateTime::new(date, time);
        assert_eq!(format_primitive(value), "2025-01-02T10:20:30Z");
    }

    #[test]
    fn format_date_pads_components() {
        let date = Date::from_calendar_date(2025, Month::March, 7).unwrap();
        assert_eq!(format_date(date), "2025-03-07");
    }
}
