// Ping output parsing

use std::time::Duration;

/// Average RTT from the ping summary line, e.g.
/// `rtt min/avg/max/mdev = 14.101/15.234/16.002/0.801 ms` (iputils) or
/// `round-trip min/avg/max/stddev = 14.1/15.2/16.0/0.8 ms` (BSD).
pub fn parse_average_rtt(output: &str) -> Option<Duration> {
    output
        .lines()
        .filter(|line| line.contains("avg"))
        .find_map(|line| {
            let (_, values) = line.split_once('=')?;
            let avg = values.trim().split('/').nth(1)?;
            let ms: f64 = avg.trim().parse().ok()?;
            Duration::try_from_secs_f64(ms / 1000.0).ok()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPUTILS_OUTPUT: &str = "\
PING 8.8.8.8 (8.8.8.8) from 192.168.1.20 wlan0: 56(84) bytes of data.
64 bytes from 8.8.8.8: icmp_seq=1 ttl=117 time=14.1 ms
64 bytes from 8.8.8.8: icmp_seq=2 ttl=117 time=15.6 ms
64 bytes from 8.8.8.8: icmp_seq=3 ttl=117 time=16.0 ms

--- 8.8.8.8 ping statistics ---
3 packets transmitted, 3 received, 0% packet loss, time 2003ms
rtt min/avg/max/mdev = 14.101/15.234/16.002/0.801 ms
";

    fn as_ms(d: Duration) -> f64 {
        d.as_secs_f64() * 1000.0
    }

    #[test]
    fn parses_iputils_summary() {
        let avg = parse_average_rtt(IPUTILS_OUTPUT).unwrap();
        assert!((as_ms(avg) - 15.234).abs() < 1e-6);
    }

    #[test]
    fn parses_bsd_summary() {
        let out = "round-trip min/avg/max/stddev = 9.000/10.500/12.000/1.200 ms\n";
        let avg = parse_average_rtt(out).unwrap();
        assert!((as_ms(avg) - 10.5).abs() < 1e-6);
    }

    #[test]
    fn missing_summary_is_none() {
        assert!(parse_average_rtt("ping: connect: Network is unreachable\n").is_none());
        assert!(parse_average_rtt("").is_none());
    }

    #[test]
    fn garbage_average_is_none() {
        assert!(parse_average_rtt("rtt min/avg/max/mdev = a/b/c/d ms").is_none());
        assert!(parse_average_rtt("avg = 12").is_none());
    }

    #[test]
    fn out_of_range_average_is_none() {
        assert!(parse_average_rtt("rtt min/avg/max/mdev = 1.0/1e300/1.0/0.0 ms\n").is_none());
        assert!(parse_average_rtt("rtt min/avg/max/mdev = 1.0/-3.5/1.0/0.0 ms\n").is_none());
        assert!(parse_average_rtt("rtt min/avg/max/mdev = 1.0/inf/1.0/0.0 ms\n").is_none());
        assert!(parse_average_rtt("rtt min/avg/max/mdev = 1.0/NaN/1.0/0.0 ms\n").is_none());
    }
}
