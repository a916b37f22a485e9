//! Decodes the text form of bus messages, one per line:
//!
//! ```text
//! @1.250 /events/bus event=781
//! /cvsa/neuroprediction/integrated softpredict.data=[0.8, 0.2]
//! ```
//!
//! The leading `@<seconds>` replay stamp is optional. Any bridge that can
//! print the two topics in this form can drive a session.

use crate::bus_message::{BusMessage, StampedMessage, EVENT_TOPIC, PREDICTION_TOPIC};

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, i32, space0, space1},
    combinator::{eof, map, opt},
    error::Error,
    multi::separated_list0,
    number::complete::{double, float},
    sequence::{delimited, preceded, terminated, tuple},
    Finish, IResult,
};

use std::str::FromStr;

fn parse_stamp(s: &str) -> IResult<&str, f64> {
    terminated(preceded(char('@'), double), space1)(s)
}

fn parse_event(s: &str) -> IResult<&str, BusMessage> {
    map(
        preceded(tuple((tag(EVENT_TOPIC), space1, tag("event="))), i32),
        BusMessage::Event,
    )(s)
}

fn parse_data(s: &str) -> IResult<&str, Vec<f32>> {
    delimited(
        tuple((char('['), space0)),
        separated_list0(tuple((space0, char(','), space0)), float),
        tuple((space0, char(']'))),
    )(s)
}

fn parse_prediction(s: &str) -> IResult<&str, BusMessage> {
    map(
        preceded(
            tuple((tag(PREDICTION_TOPIC), space1, tag("softpredict.data="))),
            parse_data,
        ),
        BusMessage::Prediction,
    )(s)
}

fn parse_stamped_message(s: &str) -> IResult<&str, StampedMessage> {
    map(
        terminated(
            tuple((opt(parse_stamp), alt((parse_event, parse_prediction)))),
            tuple((space0, eof)),
        ),
        |(at, message)| StampedMessage { at, message },
    )(s)
}

impl FromStr for StampedMessage {
    type Err = Error<String>;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_stamped_message(s.trim()).finish() {
            Ok((_remaining, message)) => Ok(message),
            Err(Error { input, code }) => Err(Error {
                input: input.to_string(),
                code,
            }),
        }
    }
}

/// Decodes one line of a bus stream. Blank lines and `#` comments give
/// `Ok(None)`.
pub fn decode_line(line: &str) -> Result<Option<StampedMessage>, Error<String>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    StampedMessage::from_str(line).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_line() {
        let s = "/events/bus event=781";
        let (leftover, res) = parse_stamped_message(s).unwrap();

        assert_eq!(leftover, "");
        assert_eq!(
            res,
            StampedMessage {
                at: None,
                message: BusMessage::Event(781)
            }
        );
    }

    #[test]
    fn stamped_prediction_line() {
        let s = "@12.5 /cvsa/neuroprediction/integrated softpredict.data=[0.8, 0.2,0.0]";
        let (leftover, res) = parse_stamped_message(s).unwrap();

        assert_eq!(leftover, "");
        assert_eq!(
            res,
            StampedMessage {
                at: Some(12.5),
                message: BusMessage::Prediction(vec![0.8, 0.2, 0.0])
            }
        );
    }

    #[test]
    fn empty_and_nan_predictions_decode() {
        let empty = decode_line("/cvsa/neuroprediction/integrated softpredict.data=[]")
            .unwrap()
            .unwrap();
        assert_eq!(empty.message, BusMessage::Prediction(vec![]));

        let nan = decode_line("/cvsa/neuroprediction/integrated softpredict.data=[NaN, 1e-1]")
            .unwrap()
            .unwrap();
        match nan.message {
            BusMessage::Prediction(data) => {
                assert!(data[0].is_nan());
                assert_eq!(data[1], 0.1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn offset_and_negative_codes() {
        let m = decode_line("  /events/bus event=33549\r\n").unwrap().unwrap();
        assert_eq!(m.message, BusMessage::Event(33549));
        let m = decode_line("/events/bus event=-4").unwrap().unwrap();
        assert_eq!(m.message, BusMessage::Event(-4));
    }

    #[test]
    fn blanks_and_comments_are_skipped() {
        assert_eq!(decode_line(""), Ok(None));
        assert_eq!(decode_line("   \n"), Ok(None));
        assert_eq!(decode_line("# recorded 2026-10-16"), Ok(None));
    }

    #[test]
    fn rejects_garbage() {
        for s in [
            "/events/bus",
            "/events/bus event=",
            "/events/bus event=12 trailing",
            "/tf event=3",
            "/cvsa/neuroprediction/integrated softpredict.data=[0.1,",
            "@x /events/bus event=1",
        ] {
            assert!(decode_line(s).is_err(), "accepted {:?}", s);
        }
    }

    #[test]
    fn display_is_decodable() {
        let messages = [
            StampedMessage {
                at: Some(3.25),
                message: BusMessage::Event(897),
            },
            BusMessage::Prediction(vec![0.25, 0.75]).into(),
        ];
        for m in messages {
            assert_eq!(decode_line(&m.to_string()).unwrap(), Some(m));
        }
    }
}
